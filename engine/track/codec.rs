use std::io;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{self, DeserializeOwned, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::common::Error;

pub const MAP_DATA: &str = "MapData";
pub const MAP_LAYOUT: &str = "MapLayout";

/**
 * Writes JSON with `", "` and `": "` separators, and everything outside printable ASCII escaped as
 * `\uXXXX`. Files written this way are byte-for-byte what the editor produces.
 */
struct EditorFormatter;

impl serde_json::ser::Formatter for EditorFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                // astral characters become a surrogate pair
                for unit in ch.encode_utf16(&mut units).iter() {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/** `{type_name: payload}` */
struct Envelope<'a, T: ?Sized>(&'a str, &'a T);

impl<'a, T: Serialize + ?Sized> Serialize for Envelope<'a, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0, self.1)?;
        map.end()
    }
}

struct Enveloped<T> {
    type_name: String,
    payload: T,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Enveloped<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EnvelopeVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EnvelopeVisitor<T> {
            type Value = Enveloped<T>;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a mapping with a single type name: payload entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Enveloped<T>, A::Error> {
                let type_name: String = map
                    .next_key()?
                    .ok_or_else(|| <A::Error as de::Error>::invalid_length(0, &self))?;
                let payload: T = map.next_value()?;
                if map.next_key::<IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(Enveloped { type_name, payload })
            }
        }

        deserializer.deserialize_map(EnvelopeVisitor(PhantomData))
    }
}

/** Serializes `payload` wrapped as `{type_name: payload}`. */
pub fn to_json<T: Serialize + ?Sized>(type_name: &str, payload: &T) -> Result<String, Error> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, EditorFormatter);
    Envelope(type_name, payload).serialize(&mut serializer)?;
    // only ASCII is ever written
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/** The type name of an enveloped document, without interpreting the payload. */
pub fn payload_type(data: &str) -> Result<String, Error> {
    let enveloped: Enveloped<IgnoredAny> = serde_json::from_str(data)?;
    Ok(enveloped.type_name)
}

pub fn from_json<T: DeserializeOwned>(type_name: &str, data: &str) -> Result<T, Error> {
    let found = payload_type(data)?;
    if found != type_name {
        return Err(Error::WrongPayloadType {
            expected: type_name.to_string(),
            found,
        });
    }
    let enveloped: Enveloped<T> = serde_json::from_str(data)?;
    Ok(enveloped.payload)
}

pub fn read_file<T: DeserializeOwned>(type_name: &str, path: &Path) -> Result<T, Error> {
    from_json(type_name, &std::fs::read_to_string(path)?)
}

pub fn write_file<T: Serialize + ?Sized>(
    type_name: &str,
    payload: &T,
    path: &Path,
) -> Result<(), Error> {
    std::fs::write(path, to_json(type_name, payload)?)?;
    Ok(())
}

#[cfg(test)]
mod codec_tests {
    use crate::codec::*;
    use std::collections::BTreeMap;

    #[test]
    fn editor_separators() {
        let mut payload = BTreeMap::new();
        payload.insert("A", vec![1, 2]);
        payload.insert("B", vec![]);
        assert_eq!(
            to_json("Thing", &payload).unwrap(),
            r#"{"Thing": {"A": [1, 2], "B": []}}"#
        );
    }

    #[test]
    fn ascii_escaping() {
        assert_eq!(
            to_json("T", "caf\u{e9} \u{1f68b}\n\u{7f}").unwrap(),
            r#"{"T": "caf\u00e9 \ud83d\ude8b\n\u007f"}"#
        );
    }

    #[test]
    fn envelope_round_trip() {
        let data = to_json("Numbers", &vec![3, 1, 2]).unwrap();
        assert_eq!(payload_type(&data).unwrap(), "Numbers");
        let numbers: Vec<u32> = from_json("Numbers", &data).unwrap();
        assert_eq!(numbers, vec![3, 1, 2]);
    }

    #[test]
    fn envelope_errors() {
        assert!(matches!(
            from_json::<Vec<u32>>("Numbers", r#"{"Letters": ["a"]}"#),
            Err(Error::WrongPayloadType { .. })
        ));
        assert!(matches!(
            from_json::<Vec<u32>>("Numbers", r#"{}"#),
            Err(Error::JsonError(_))
        ));
        assert!(matches!(
            from_json::<Vec<u32>>("Numbers", r#"{"Numbers": [], "Extra": []}"#),
            Err(Error::JsonError(_))
        ));
    }
}
