use crate::intake::ValidationError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            pub fn all() -> &'static [$name] {
                &[$(Self::$variant),+]
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ValidationError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// Forced-draught (FF) or forced-exhaust (FE) flue.
str_enum!(FlueType {
    Ff => "FF",
    Fe => "FE",
});

str_enum!(LabelSet {
    Korean => "korean",
    English => "english",
});

impl Default for FlueType {
    fn default() -> Self {
        Self::Ff
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::Korean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn flue_type_round_trips_through_str() {
        for flue in FlueType::all() {
            assert_eq!(FlueType::from_str(flue.as_str()).unwrap(), *flue);
        }
    }

    #[test]
    fn flue_type_is_case_sensitive() {
        let err = FlueType::from_str("ff").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEnum { .. }));
    }

    #[test]
    fn label_set_parses_cli_names() {
        assert_eq!(LabelSet::from_str("english").unwrap(), LabelSet::English);
        assert_eq!(LabelSet::from_str("korean").unwrap(), LabelSet::Korean);
        assert!(LabelSet::from_str("french").is_err());
    }

    #[test]
    fn flue_type_serializes_as_code() {
        let json = serde_json::to_string(&FlueType::Fe).unwrap();
        assert_eq!(json, "\"FE\"");
    }

    #[test]
    fn defaults_match_production_form() {
        assert_eq!(FlueType::default(), FlueType::Ff);
        assert_eq!(LabelSet::default(), LabelSet::Korean);
    }
}
