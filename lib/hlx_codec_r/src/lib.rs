//! LC-R: the glyph-based display and interchange projection of the HLX
//! value model. Bijective with LC-B over the defined
//! value subset — `decode_value` is a full inverse of `encode_value`,
//! not merely a display-only renderer.

mod decode;
mod encode;
mod error;
pub mod glyphs;

pub use decode::decode_value;
pub use encode::encode_value;
pub use error::CodecError;

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_value::{Contract, Digest, Handle, Object, Value, TAG_GENERIC};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn primitives_use_the_expected_glyphs() {
        assert_eq!(encode_value(&Value::Null).unwrap(), "\u{2205}");
        assert_eq!(encode_value(&Value::Bool(true)).unwrap(), "\u{22A4}");
        assert_eq!(encode_value(&Value::Bool(false)).unwrap(), "\u{22A5}");
        assert_eq!(encode_value(&Value::Int(42)).unwrap(), "\u{1F703}42");
    }

    #[test]
    fn scalars_round_trip() {
        let samples = vec![
            Value::Null,
            Value::Bool(true),
            Value::Bool(false),
            Value::Int(0),
            Value::Int(-9_223_372_036_854_775_808),
            Value::Int(9_223_372_036_854_775_807),
            Value::Float(2.5),
            Value::Float(-100.0),
            Value::Text("runic \"glyphs\"".to_string()),
            Value::Bytes(vec![]),
            Value::Bytes(vec![0x01, 0xFF]),
            Value::Handle(Handle::new(TAG_GENERIC, Digest([0x42; 32]))),
        ];
        for value in samples {
            let encoded = encode_value(&value).unwrap();
            let decoded = decode_value(&encoded).unwrap();
            assert_eq!(decoded, value, "round trip failed for {encoded:?}");
        }
    }

    #[test]
    fn containers_round_trip() {
        let mut obj = Object::new();
        obj.insert("x", Value::Int(1)).unwrap();
        obj.insert("y", Value::Bool(true)).unwrap();
        let samples = vec![
            Value::Array(vec![]),
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Null]),
            Value::Object(Object::new()),
            Value::Object(obj),
        ];
        for value in samples {
            let encoded = encode_value(&value).unwrap();
            assert_eq!(decode_value(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn contract_round_trips() {
        let contract = Contract::new(14, vec![(0, Value::Int(42))]).unwrap();
        let value = Value::Contract(contract);
        let encoded = encode_value(&value).unwrap();
        assert_eq!(decode_value(&encoded).unwrap(), value);
    }

    #[test]
    fn encode_rejects_nan_and_infinity() {
        assert!(encode_value(&Value::Float(f64::NAN)).is_err());
        assert!(encode_value(&Value::Float(f64::NEG_INFINITY)).is_err());
    }

    #[test]
    fn decode_rejects_unknown_character() {
        assert!(decode_value("x").is_err());
    }

    #[test]
    fn decode_rejects_trailing_content() {
        let mut encoded = encode_value(&Value::Int(1)).unwrap();
        encoded.push(glyphs::NULL);
        assert!(decode_value(&encoded).is_err());
    }

    #[test]
    fn random_values_round_trip() {
        let mut rng = StdRng::seed_from_u64(0xC0DE_F00D);
        for _ in 0..200 {
            let value = random_value(&mut rng, 0);
            let encoded = encode_value(&value).unwrap();
            let decoded = decode_value(&encoded).unwrap();
            assert_eq!(decoded, value);
        }
    }

    fn random_value(rng: &mut StdRng, depth: u32) -> Value {
        let max_variant = if depth >= 3 { 5 } else { 7 };
        match rng.gen_range(0..=max_variant) {
            0 => Value::Null,
            1 => Value::Bool(rng.gen()),
            2 => Value::Int(rng.gen()),
            3 => {
                let f: f64 = rng.gen_range(-1e6..1e6);
                Value::Float(f)
            }
            4 => Value::Text((0..rng.gen_range(0..8)).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()),
            5 => Value::Bytes((0..rng.gen_range(0..8)).map(|_| rng.gen()).collect()),
            6 => {
                let len = rng.gen_range(0..4);
                Value::Array((0..len).map(|_| random_value(rng, depth + 1)).collect())
            }
            _ => {
                let len = rng.gen_range(0..4);
                let mut obj = Object::new();
                for i in 0..len {
                    obj.insert(format!("k{i}"), random_value(rng, depth + 1)).unwrap();
                }
                Value::Object(obj)
            }
        }
    }
}
