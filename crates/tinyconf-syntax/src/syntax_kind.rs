#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SyntaxKind {
    LEFT_BRACE,
    RIGHT_BRACE,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    EQ,
    COLON,
    COMMA,
    DOT,
    NEWLINE,

    BARE_KEY,
    EXPORT_KW,

    BASIC_STRING,
    LITERAL_STRING,
    MULTILINE_BASIC_STRING,
    MULTILINE_LITERAL_STRING,
    INTEGER,
    FLOAT,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,
    DATETIME,
    ENV_VALUE,

    EOF,
}

impl SyntaxKind {
    pub const ALL: [Self; 23] = [
        Self::LEFT_BRACE,
        Self::RIGHT_BRACE,
        Self::LEFT_BRACKET,
        Self::RIGHT_BRACKET,
        Self::EQ,
        Self::COLON,
        Self::COMMA,
        Self::DOT,
        Self::NEWLINE,
        Self::BARE_KEY,
        Self::EXPORT_KW,
        Self::BASIC_STRING,
        Self::LITERAL_STRING,
        Self::MULTILINE_BASIC_STRING,
        Self::MULTILINE_LITERAL_STRING,
        Self::INTEGER,
        Self::FLOAT,
        Self::TRUE_KW,
        Self::FALSE_KW,
        Self::NULL_KW,
        Self::DATETIME,
        Self::ENV_VALUE,
        Self::EOF,
    ];

    pub const fn is_string(self) -> bool {
        matches!(
            self,
            Self::BASIC_STRING
                | Self::LITERAL_STRING
                | Self::MULTILINE_BASIC_STRING
                | Self::MULTILINE_LITERAL_STRING
        )
    }

    pub const fn is_scalar(self) -> bool {
        self.is_string()
            || matches!(
                self,
                Self::INTEGER
                    | Self::FLOAT
                    | Self::TRUE_KW
                    | Self::FALSE_KW
                    | Self::NULL_KW
                    | Self::DATETIME
                    | Self::ENV_VALUE
            )
    }

    /// Human readable name used in "expected X, found Y" messages.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::LEFT_BRACE => "`{`",
            Self::RIGHT_BRACE => "`}`",
            Self::LEFT_BRACKET => "`[`",
            Self::RIGHT_BRACKET => "`]`",
            Self::EQ => "`=`",
            Self::COLON => "`:`",
            Self::COMMA => "`,`",
            Self::DOT => "`.`",
            Self::NEWLINE => "newline",
            Self::BARE_KEY => "key",
            Self::EXPORT_KW => "`export`",
            Self::BASIC_STRING | Self::MULTILINE_BASIC_STRING => "string",
            Self::LITERAL_STRING | Self::MULTILINE_LITERAL_STRING => "literal string",
            Self::INTEGER => "integer",
            Self::FLOAT => "float",
            Self::TRUE_KW | Self::FALSE_KW => "boolean",
            Self::NULL_KW => "`null`",
            Self::DATETIME => "datetime",
            Self::ENV_VALUE => "value",
            Self::EOF => "end of file",
        }
    }
}
