//! Number format types

/// First id available for custom number formats
pub const FIRST_CUSTOM_NUM_FMT_ID: u32 = 164;

/// Built-in formats every consumer knows without a `<numFmt>` record
const BUILTIN_FORMATS: &[(u32, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "m/d/yyyy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yyyy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

/// Number format for cell display
///
/// Format codes are stored verbatim; their locale semantics are left to the
/// consuming application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// 2 - 0.00
    pub const ID_NUMBER_DEC2: u32 = 2;
    /// 4 - #,##0.00
    pub const ID_NUMBER_SEP_DEC2: u32 = 4;
    /// 10 - 0.00%
    pub const ID_PERCENT_DEC2: u32 = 10;
    /// 14 - m/d/yyyy
    pub const ID_DATE_SHORT: u32 = 14;
    /// 22 - m/d/yyyy h:mm
    pub const ID_DATETIME: u32 = 22;
    /// 49 - @
    pub const ID_TEXT: u32 = 49;

    /// Create a number format from a format string
    pub fn from_string<S: Into<String>>(format: S) -> Self {
        NumberFormat::Custom(format.into())
    }

    /// Canonical form used for deduplication
    ///
    /// A custom code that spells a built-in format becomes that built-in, and
    /// every spelling of "General" becomes [`NumberFormat::General`].
    pub fn normalized(&self) -> Self {
        match self {
            NumberFormat::General | NumberFormat::BuiltIn(0) => NumberFormat::General,
            NumberFormat::BuiltIn(id) => NumberFormat::BuiltIn(*id),
            NumberFormat::Custom(code) => {
                if code.is_empty() || code.eq_ignore_ascii_case("general") {
                    return NumberFormat::General;
                }
                match BUILTIN_FORMATS.iter().find(|(_, c)| *c == code.as_str()) {
                    Some((0, _)) => NumberFormat::General,
                    Some((id, _)) => NumberFormat::BuiltIn(*id),
                    None => NumberFormat::Custom(code.clone()),
                }
            }
        }
    }

    /// Built-in id, or `None` for custom codes that need a `<numFmt>` record
    pub fn builtin_id(&self) -> Option<u32> {
        match self {
            NumberFormat::General => Some(0),
            NumberFormat::BuiltIn(id) => Some(*id),
            NumberFormat::Custom(_) => None,
        }
    }

    /// Get the format code
    pub fn format_code(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => BUILTIN_FORMATS
                .iter()
                .find(|(i, _)| i == id)
                .map(|(_, code)| *code)
                .unwrap_or("General"),
            NumberFormat::Custom(code) => code,
        }
    }
}
