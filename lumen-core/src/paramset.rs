use std::collections::HashMap;

use crate::spectrum::Spectrum;
use crate::Vector3f;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f32),
    Str(String),
    Spectrum(Spectrum),
    Vector(Vector3f),
}

/// Loosely-typed parameter bag carrying renderer and scheduler
/// configuration. Lookups fall back to a caller-provided default, so a
/// missing key is never an error; a key of the wrong type is treated as
/// missing.
#[derive(Debug, Clone, Default)]
pub struct Props {
    values: HashMap<String, Value>,
}

impl Props {
    pub fn new() -> Props {
        Props::default()
    }

    pub fn set(&mut self, name: &str, value: Value) -> &mut Props {
        self.values.insert(name.to_owned(), value);
        self
    }

    pub fn set_bool(&mut self, name: &str, v: bool) -> &mut Props {
        self.set(name, Value::Bool(v))
    }

    pub fn set_int(&mut self, name: &str, v: i64) -> &mut Props {
        self.set(name, Value::Int(v))
    }

    pub fn set_float(&mut self, name: &str, v: f32) -> &mut Props {
        self.set(name, Value::Float(v))
    }

    pub fn set_str(&mut self, name: &str, v: &str) -> &mut Props {
        self.set(name, Value::Str(v.to_owned()))
    }

    pub fn set_spectrum(&mut self, name: &str, v: Spectrum) -> &mut Props {
        self.set(name, Value::Spectrum(v))
    }

    pub fn set_vector(&mut self, name: &str, v: Vector3f) -> &mut Props {
        self.set(name, Value::Vector(v))
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn find_one_bool(&self, name: &str, default: bool) -> bool {
        match self.values.get(name) {
            Some(Value::Bool(v)) => *v,
            _ => default,
        }
    }

    pub fn find_one_int(&self, name: &str, default: i64) -> i64 {
        match self.values.get(name) {
            Some(Value::Int(v)) => *v,
            _ => default,
        }
    }

    pub fn find_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(Value::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn find_one_float(&self, name: &str, default: f32) -> f32 {
        match self.values.get(name) {
            Some(Value::Float(v)) => *v,
            Some(Value::Int(v)) => *v as f32,
            _ => default,
        }
    }

    pub fn find_one_string(&self, name: &str, default: &str) -> String {
        match self.values.get(name) {
            Some(Value::Str(v)) => v.clone(),
            _ => default.to_owned(),
        }
    }

    pub fn find_one_spectrum(&self, name: &str, default: Spectrum) -> Spectrum {
        match self.values.get(name) {
            Some(Value::Spectrum(v)) => *v,
            Some(Value::Float(v)) => Spectrum::grey(*v),
            _ => default,
        }
    }

    pub fn find_one_vector(&self, name: &str, default: Vector3f) -> Vector3f {
        match self.values.get(name) {
            Some(Value::Vector(v)) => *v,
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_with_defaults() {
        let mut ps = Props::new();
        ps.set_int("max_length", 20)
            .set_str("mode", "nee")
            .set_float("rr_prob", 0.4);

        assert_eq!(ps.find_one_int("max_length", 6), 20);
        assert_eq!(ps.find_one_int("missing", 6), 6);
        assert_eq!(ps.find_one_string("mode", "mis"), "nee");
        assert_eq!(ps.find_one_float("rr_prob", 0.2), 0.4);
        assert!(!ps.has("seed"));
    }

    #[test]
    fn test_numeric_coercion() {
        let mut ps = Props::new();
        ps.set_int("spp", 16);
        // An int is acceptable where a float is expected.
        assert_eq!(ps.find_one_float("spp", 0.0), 16.0);
        // A float where an int is expected is not.
        ps.set_float("workers", 2.0);
        assert_eq!(ps.find_one_int("workers", 8), 8);
    }
}
