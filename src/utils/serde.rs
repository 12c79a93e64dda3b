use serde::{Deserializer, de};
use std::fmt;

/// Deserializes `Option<Vec<String>>` from either a sequence or a single string.
///
/// Environment variables can only carry one string, so a string is split on
/// newlines and commas. Blank entries are dropped; an empty result is `None`.
pub fn deserialize_opt_vec_from_string<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct VecStringVisitor;

    impl<'de> de::Visitor<'de> for VecStringVisitor {
        type Value = Option<Vec<String>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a sequence of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let items: Vec<String> = value
                .split(['\n', ','])
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            Ok(if items.is_empty() { None } else { Some(items) })
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut items: Vec<String> = Vec::new();
            while let Some(element) = seq.next_element::<String>()? {
                let element = element.trim();
                if !element.is_empty() {
                    items.push(element.to_string());
                }
            }
            Ok(if items.is_empty() { None } else { Some(items) })
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(VecStringVisitor)
}
