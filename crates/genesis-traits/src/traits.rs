//! Trait wrapper over a single trait record.
//!
//! A [`Trait`] binds one record to its registered [`TraitType`]. Reads fall
//! back to the type's declared defaults; writes go straight into the record.
//! Numeric kinds expose computed values on top of the raw fields:
//!
//! - numeric: `actual = base`
//! - static: `actual = base + mod`
//! - counter/gauge: `actual = clamp(base + mod, min_value, max_value)`, with
//!   `current` kept inside the bounds on every write. A `null` bound leaves
//!   that side open.

use crate::error::{TraitError, TraitResult};
use crate::kind::{
    TraitKind, TraitType, BASE_FIELD, CURRENT_FIELD, MAX_FIELD, MIN_FIELD, MOD_FIELD,
    VALUE_FIELD,
};
use crate::schema::{TraitData, TraitSchema, NAME_FIELD, TYPE_FIELD};
use serde_json::{Number, Value};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// Largest magnitude stored as an integer; beyond this f64 loses precision.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A trait bound to its record.
#[derive(Debug, Clone, PartialEq)]
pub struct Trait {
    key: String,
    trait_type: Arc<TraitType>,
    data: TraitData,
}

impl Trait {
    /// Creates a trait from a candidate definition, validating it first.
    pub fn new(
        key: impl Into<String>,
        trait_type: Arc<TraitType>,
        data: &TraitData,
    ) -> TraitResult<Self> {
        let data = Self::validate_input(&trait_type, data)?;
        Ok(Self {
            key: key.into(),
            trait_type,
            data,
        })
    }

    /// The registered type this trait is bound to.
    pub(crate) fn type_handle(&self) -> &Arc<TraitType> {
        &self.trait_type
    }

    /// Wraps a record read back from storage.
    pub(crate) fn from_record(
        key: impl Into<String>,
        trait_type: Arc<TraitType>,
        data: TraitData,
    ) -> TraitResult<Self> {
        let key = key.into();
        for spec in trait_type.schema().fields() {
            if trait_type.schema().is_mandatory(&spec.name) && !data.contains_key(&spec.name) {
                return Err(TraitError::CorruptRecord {
                    key,
                    reason: format!("missing mandatory field '{}'", spec.name),
                });
            }
        }
        Ok(Self {
            key,
            trait_type,
            data,
        })
    }

    /// Validates a definition against a trait type without creating a trait.
    ///
    /// Besides the schema check, the definition's `trait_type` must name
    /// `trait_type`.
    pub fn validate_input(trait_type: &TraitType, data: &TraitData) -> TraitResult<TraitData> {
        let validated = trait_type.schema().validate_input(data)?;
        match validated.get(TYPE_FIELD).and_then(Value::as_str) {
            Some(name) if name == trait_type.name() => Ok(validated),
            other => Err(TraitError::InvalidInput(format!(
                "trait_type {} does not match '{}'",
                other.map_or_else(|| "<missing>".to_owned(), |n| format!("'{n}'")),
                trait_type.name()
            ))),
        }
    }

    /// Key the trait is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display label.
    #[must_use]
    pub fn name(&self) -> &str {
        self.data
            .get(NAME_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Name of the registered trait type.
    #[must_use]
    pub fn trait_type(&self) -> &str {
        self.trait_type.name()
    }

    /// Behaviour family.
    #[must_use]
    pub fn kind(&self) -> TraitKind {
        self.trait_type.kind()
    }

    /// Field schema of the trait type.
    #[must_use]
    pub fn schema(&self) -> &TraitSchema {
        self.trait_type.schema()
    }

    /// The raw record, without defaults.
    #[must_use]
    pub fn data(&self) -> &TraitData {
        &self.data
    }

    /// Stored value of a field, or its declared default.
    #[must_use]
    pub fn get_ref(&self, field: &str) -> Option<&Value> {
        self.data
            .get(field)
            .or_else(|| self.schema().default_for(field))
    }

    /// Stored value of a field, or its declared default.
    pub fn get(&self, field: &str) -> TraitResult<Value> {
        self.get_ref(field)
            .cloned()
            .ok_or_else(|| TraitError::FieldNotFound(field.to_owned()))
    }

    /// Writes a field.
    ///
    /// On counters and gauges the numeric fields go through their bounded
    /// setters, so the stored value may differ from `value`.
    pub fn set(&mut self, field: &str, value: Value) -> TraitResult<()> {
        if field == TYPE_FIELD {
            return Err(TraitError::ReadOnlyField(field.to_owned()));
        }

        let schema = self.schema();
        if !schema.is_declared(field) && !schema.allows_extra_properties() {
            return Err(TraitError::ExtraNotAllowed {
                trait_type: self.trait_type().to_owned(),
                field: field.to_owned(),
            });
        }

        match field {
            NAME_FIELD if !value.is_string() => Err(TraitError::InvalidValue {
                field: field.to_owned(),
                value: value.to_string(),
            }),
            BASE_FIELD if self.kind().is_numeric() => self.set_base(as_number(field, &value)?),
            MOD_FIELD if self.kind().has_mod() => self.set_mod(as_number(field, &value)?),
            CURRENT_FIELD if self.kind().is_bounded() => {
                self.set_current(as_number(field, &value)?)
            },
            MIN_FIELD if self.kind().is_bounded() => {
                self.set_min_value(as_bound(field, &value)?)
            },
            MAX_FIELD if self.kind().is_bounded() => {
                self.set_max_value(as_bound(field, &value)?)
            },
            _ => {
                self.data.insert(field.to_owned(), value);
                Ok(())
            },
        }
    }

    /// Deletes a field.
    ///
    /// Declared optional fields are reset to their default, extra fields are
    /// removed. Mandatory fields cannot be deleted.
    pub fn delete(&mut self, field: &str) -> TraitResult<()> {
        if self.schema().is_mandatory(field) {
            return Err(TraitError::ReadOnlyField(field.to_owned()));
        }

        if let Some(default) = self.schema().default_for(field).cloned() {
            return self.set(field, default);
        }

        self.data
            .shift_remove(field)
            .map(|_| ())
            .ok_or_else(|| TraitError::FieldNotFound(field.to_owned()))
    }

    /// The free-form value of a plain trait.
    pub fn value(&self) -> TraitResult<Value> {
        self.get(VALUE_FIELD)
    }

    // ------------------------------------------------------------------
    // Numeric fields
    // ------------------------------------------------------------------

    /// Base value.
    pub fn base(&self) -> TraitResult<f64> {
        self.require(self.kind().is_numeric(), BASE_FIELD)?;
        self.number(BASE_FIELD)
    }

    /// Sets `base`; on bounded kinds it is clamped into the bounds.
    pub fn set_base(&mut self, base: f64) -> TraitResult<()> {
        self.require(self.kind().is_numeric(), BASE_FIELD)?;
        let base = if self.kind().is_bounded() {
            clamp(base, self.min_value()?, self.max_value()?)
        } else {
            base
        };
        self.write_number(BASE_FIELD, base)?;
        self.reclamp_current()
    }

    /// Modifier.
    pub fn modifier(&self) -> TraitResult<f64> {
        self.require(self.kind().has_mod(), MOD_FIELD)?;
        self.number(MOD_FIELD)
    }

    /// Sets `mod`.
    ///
    /// On a gauge a buff raises `current` by the same amount, while a debuff
    /// only pulls `current` down to the new `base + mod`.
    pub fn set_mod(&mut self, modifier: f64) -> TraitResult<()> {
        self.require(self.kind().has_mod(), MOD_FIELD)?;
        let previous = self.modifier()?;
        self.write_number(MOD_FIELD, modifier)?;
        if self.kind() != TraitKind::Gauge {
            return self.reclamp_current();
        }

        let current = self.current()?;
        let current = if modifier > previous {
            current + (modifier - previous)
        } else {
            current.min(self.base()? + modifier)
        };
        self.set_current(current)
    }

    /// Sets `mod` back to zero.
    pub fn reset_mod(&mut self) -> TraitResult<()> {
        self.set_mod(0.0)
    }

    /// Computed value.
    pub fn actual(&self) -> TraitResult<f64> {
        match self.kind() {
            TraitKind::Trait => Err(TraitError::FieldNotFound("actual".to_owned())),
            TraitKind::Numeric => self.base(),
            TraitKind::Static => Ok(self.base()? + self.modifier()?),
            TraitKind::Counter | TraitKind::Gauge => Ok(clamp(
                self.base()? + self.modifier()?,
                self.min_value()?,
                self.max_value()?,
            )),
        }
    }

    /// Current value of a counter or gauge.
    pub fn current(&self) -> TraitResult<f64> {
        self.require(self.kind().is_bounded(), CURRENT_FIELD)?;
        self.number(CURRENT_FIELD)
    }

    /// Sets `current`, clamped into `[min_value, max_value]`.
    pub fn set_current(&mut self, current: f64) -> TraitResult<()> {
        self.require(self.kind().is_bounded(), CURRENT_FIELD)?;
        let current = clamp(current, self.min_value()?, self.max_value()?);
        self.write_number(CURRENT_FIELD, current)
    }

    /// Lower bound, `None` when unbounded.
    pub fn min_value(&self) -> TraitResult<Option<f64>> {
        self.require(self.kind().is_bounded(), MIN_FIELD)?;
        self.bound(MIN_FIELD)
    }

    /// Sets the lower bound. It may not exceed `base`.
    pub fn set_min_value(&mut self, min: Option<f64>) -> TraitResult<()> {
        self.require(self.kind().is_bounded(), MIN_FIELD)?;
        let min = match min {
            Some(min) => Some(min.min(self.base()?)),
            None => None,
        };
        self.write_bound(MIN_FIELD, min)?;
        self.reclamp_current()
    }

    /// Upper bound, `None` when unbounded.
    pub fn max_value(&self) -> TraitResult<Option<f64>> {
        self.require(self.kind().is_bounded(), MAX_FIELD)?;
        self.bound(MAX_FIELD)
    }

    /// Sets the upper bound. It may not drop below `base`.
    pub fn set_max_value(&mut self, max: Option<f64>) -> TraitResult<()> {
        self.require(self.kind().is_bounded(), MAX_FIELD)?;
        let max = match max {
            Some(max) => Some(max.max(self.base()?)),
            None => None,
        };
        self.write_bound(MAX_FIELD, max)?;
        self.reclamp_current()
    }

    /// Sets `current` back to `base`, within bounds.
    pub fn reset_current(&mut self) -> TraitResult<()> {
        let base = self.base()?;
        self.set_current(base)
    }

    /// Refills a gauge by `base + mod`, capped at `max_value`.
    pub fn fill_gauge(&mut self) -> TraitResult<()> {
        self.require(self.kind() == TraitKind::Gauge, "fill_gauge")?;
        let refill = self.base()? + self.modifier()?;
        self.set_current(self.current()? + refill)
    }

    /// How full a counter or gauge is, in percent.
    ///
    /// `current` is measured against `max_value`, or `base` when unbounded.
    /// A zero ceiling counts as full.
    pub fn percent(&self) -> TraitResult<f64> {
        let current = self.current()?;
        let ceiling = match self.max_value()? {
            Some(max) => max,
            None => self.base()?,
        };
        if ceiling == 0.0 {
            return Ok(100.0);
        }
        Ok(current / ceiling * 100.0)
    }

    /// [`Trait::percent`] formatted with one decimal, e.g. `"33.3%"`.
    pub fn percent_string(&self) -> TraitResult<String> {
        Ok(format!("{:.1}%", self.percent()?))
    }

    fn reclamp_current(&mut self) -> TraitResult<()> {
        if !self.kind().is_bounded() {
            return Ok(());
        }
        let current = self.current()?;
        self.set_current(current)
    }

    fn require(&self, declared: bool, field: &str) -> TraitResult<()> {
        if declared {
            Ok(())
        } else {
            Err(TraitError::FieldNotFound(field.to_owned()))
        }
    }

    fn number(&self, field: &str) -> TraitResult<f64> {
        let value = self
            .get_ref(field)
            .ok_or_else(|| TraitError::FieldNotFound(field.to_owned()))?;
        as_number(field, value)
    }

    fn bound(&self, field: &str) -> TraitResult<Option<f64>> {
        match self.get_ref(field) {
            Some(value) => as_bound(field, value),
            None => Ok(None),
        }
    }

    fn write_number(&mut self, field: &str, number: f64) -> TraitResult<()> {
        let value = number_value(field, number)?;
        self.data.insert(field.to_owned(), value);
        Ok(())
    }

    fn write_bound(&mut self, field: &str, bound: Option<f64>) -> TraitResult<()> {
        match bound {
            Some(number) => self.write_number(field, number),
            None => {
                self.data.insert(field.to_owned(), Value::Null);
                Ok(())
            },
        }
    }
}

impl Index<&str> for Trait {
    type Output = Value;

    fn index(&self, field: &str) -> &Value {
        match self.get_ref(field) {
            Some(value) => value,
            None => panic!("trait '{}' has no field '{field}'", self.key),
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.name(), self.key, self.trait_type())?;
        match self.kind() {
            TraitKind::Trait => match self.get_ref(VALUE_FIELD) {
                Some(value) => write!(f, ": {value}"),
                None => Ok(()),
            },
            TraitKind::Numeric | TraitKind::Static => match self.actual() {
                Ok(actual) => write!(f, ": {actual}"),
                Err(_) => f.write_str(": ?"),
            },
            TraitKind::Counter | TraitKind::Gauge => {
                match (self.current(), self.max_value()) {
                    (Ok(current), Ok(Some(upper))) => write!(f, ": {current}/{upper}"),
                    (Ok(current), Ok(None)) => write!(f, ": {current}"),
                    _ => f.write_str(": ?"),
                }
            },
        }
    }
}

fn clamp(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let value = min.map_or(value, |min| value.max(min));
    max.map_or(value, |max| value.min(max))
}

fn as_number(field: &str, value: &Value) -> TraitResult<f64> {
    value.as_f64().ok_or_else(|| TraitError::InvalidValue {
        field: field.to_owned(),
        value: value.to_string(),
    })
}

fn as_bound(field: &str, value: &Value) -> TraitResult<Option<f64>> {
    if value.is_null() {
        Ok(None)
    } else {
        as_number(field, value).map(Some)
    }
}

/// Whole numbers are stored as integers so they compare equal to defaults.
fn number_value(field: &str, number: f64) -> TraitResult<Value> {
    if number.fract() == 0.0 && number.abs() <= MAX_EXACT_INT {
        return Ok(Value::from(number as i64));
    }
    Number::from_f64(number)
        .map(Value::Number)
        .ok_or_else(|| TraitError::InvalidValue {
            field: field.to_owned(),
            value: number.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> TraitData {
        match value {
            Value::Object(map) => map,
            _ => panic!("test data must be an object"),
        }
    }

    fn make(kind: TraitKind, fields: Value) -> Trait {
        let mut record = data(fields);
        record.insert("trait_type".into(), json!(kind.as_str()));
        Trait::new("test", Arc::new(TraitType::builtin(kind)), &record).expect("valid trait")
    }

    fn counter() -> Trait {
        make(
            TraitKind::Counter,
            json!({"name": "Bonus/Penalty", "base": 0, "mod": 0, "min_value": -3, "max_value": 3}),
        )
    }

    fn gauge() -> Trait {
        make(
            TraitKind::Gauge,
            json!({"name": "HP", "base": 10, "mod": 0, "current": 10, "min_value": 0}),
        )
    }

    #[test]
    fn test_getset_with_extras() {
        let mut t = make(
            TraitKind::Trait,
            json!({"name": "Test1", "value": "value", "extra_val1": "xvalue1", "extra_val2": "xvalue2"}),
        );
        assert_eq!(t.name(), "Test1");
        assert_eq!(t["name"], json!("Test1"));
        assert_eq!(t.value().expect("declared"), json!("value"));
        assert_eq!(t["extra_val2"], json!("xvalue2"));

        t.set("value", json!(20)).expect("set");
        assert_eq!(t["value"], json!(20));
        t.set("extra_val1", json!(100)).expect("set");
        assert_eq!(t.get("extra_val1").expect("extra"), json!(100));
        t.set("foo", json!("bar")).expect("extras allowed");
        assert_eq!(t.get("foo").expect("extra"), json!("bar"));

        t.delete("foo").expect("delete extra");
        assert!(matches!(t.get("foo"), Err(TraitError::FieldNotFound(f)) if f == "foo"));
        assert!(t.get_ref("foo").is_none());
        t.delete("extra_val1").expect("delete extra");
        assert!(t.get("extra_val1").is_err());
        assert!(t.delete("extra_val1").is_err());

        t.delete("value").expect("delete declared");
        assert_eq!(t.value().expect("default"), Value::Null);
        assert_eq!(t.data().get("value"), Some(&Value::Null));
    }

    #[test]
    fn test_mandatory_and_type_fields() {
        let mut t = make(TraitKind::Trait, json!({"name": "Test1"}));
        assert!(matches!(
            t.set("name", json!(42)),
            Err(TraitError::InvalidValue { ref field, .. }) if field == "name"
        ));
        assert_eq!(t.name(), "Test1");
        assert!(matches!(
            t.set("trait_type", json!("gauge")),
            Err(TraitError::ReadOnlyField(_))
        ));
        assert!(matches!(t.delete("name"), Err(TraitError::ReadOnlyField(_))));
        t.set("name", json!("Renamed")).expect("name is writable");
        assert_eq!(t.name(), "Renamed");
        assert_eq!(t.trait_type(), "trait");
    }

    #[test]
    fn test_extras_rejected_when_disallowed() {
        let trait_type = Arc::new(TraitType::new(
            "strict",
            TraitKind::Trait,
            TraitKind::Trait.schema().allow_extra_properties(false),
        ));
        let record = data(json!({"name": "S", "trait_type": "strict", "junk": 1}));
        let mut t = Trait::new("s", trait_type, &record).expect("valid");

        assert!(t.data().get("junk").is_none());
        assert!(matches!(
            t.set("junk", json!(2)),
            Err(TraitError::ExtraNotAllowed { .. })
        ));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let record = data(json!({"name": "S", "trait_type": "gauge"}));
        let err = Trait::new("s", Arc::new(TraitType::builtin(TraitKind::Static)), &record)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    #[should_panic(expected = "has no field 'nope'")]
    fn test_index_panics_on_unknown_field() {
        let t = make(TraitKind::Trait, json!({"name": "Test1"}));
        let _ = &t["nope"];
    }

    #[test]
    fn test_numeric_actual() {
        let mut t = make(TraitKind::Numeric, json!({"name": "Level", "base": 3}));
        assert_eq!(t.actual().expect("numeric"), 3.0);
        t.set_base(4.0).expect("set");
        assert_eq!(t.data().get("base"), Some(&json!(4)));
        assert!(matches!(t.modifier(), Err(TraitError::FieldNotFound(_))));
        assert!(t.set_mod(1.0).is_err());
    }

    #[test]
    fn test_static_base_and_mod() {
        let mut t = make(TraitKind::Static, json!({"name": "Strength", "base": 8}));
        assert_eq!(t.actual().expect("static"), 8.0);

        t.set_base(9.0).expect("set");
        assert_eq!(t.actual().expect("static"), 9.0);

        t.set_mod(1.0).expect("set");
        assert_eq!(t.actual().expect("static"), 10.0);

        t.reset_mod().expect("reset");
        assert_eq!(t.modifier().expect("mod"), 0.0);
        assert!(t.current().is_err());
        assert!(t.min_value().is_err());
    }

    #[test]
    fn test_plain_trait_has_no_actual() {
        let t = make(TraitKind::Trait, json!({"name": "Test1"}));
        assert!(t.actual().is_err());
        assert!(t.base().is_err());
    }

    #[test]
    fn test_non_numeric_write_rejected() {
        let mut t = make(TraitKind::Static, json!({"name": "Strength"}));
        assert!(matches!(
            t.set("base", json!("lots")),
            Err(TraitError::InvalidValue { .. })
        ));
        assert!(t.set_base(f64::NAN).is_err());
    }

    #[test]
    fn test_counter_initial_state() {
        let t = counter();
        assert_eq!(t.base().expect("base"), 0.0);
        assert_eq!(t.current().expect("current"), 0.0);
        assert_eq!(t.actual().expect("actual"), 0.0);
        assert_eq!(t.min_value().expect("min"), Some(-3.0));
        assert_eq!(t.max_value().expect("max"), Some(3.0));
    }

    #[test]
    fn test_counter_current_bounds() {
        let mut t = counter();
        t.set_current(5.0).expect("set");
        assert_eq!(t.current().expect("current"), 3.0);

        t.set_current(-5.0).expect("set");
        assert_eq!(t.current().expect("current"), -3.0);

        t.set_max_value(None).expect("unbound");
        t.set_current(10_000_000.0).expect("set");
        assert_eq!(t.current().expect("current"), 10_000_000.0);

        t.set_min_value(None).expect("unbound");
        t.set_current(-10_000_000.0).expect("set");
        assert_eq!(t.current().expect("current"), -10_000_000.0);
    }

    #[test]
    fn test_counter_generic_set_clamps() {
        let mut t = counter();
        t.set("current", json!(7)).expect("set");
        assert_eq!(t.data().get("current"), Some(&json!(3)));
        t.set("max_value", Value::Null).expect("unbound");
        assert_eq!(t.max_value().expect("max"), None);
    }

    #[test]
    fn test_counter_actual_clamped() {
        let mut t = counter();
        t.set_mod(2.0).expect("set");
        assert_eq!(t.actual().expect("actual"), 2.0);

        t.set_mod(4.0).expect("set");
        assert_eq!(t.actual().expect("actual"), 3.0);

        t.set_mod(-4.0).expect("set");
        assert_eq!(t.actual().expect("actual"), -3.0);
    }

    #[test]
    fn test_counter_bounds_follow_base() {
        let mut t = counter();
        t.set_max_value(Some(-1.0)).expect("set");
        assert_eq!(t.max_value().expect("max"), Some(0.0));

        let mut t = counter();
        t.set_min_value(Some(1.0)).expect("set");
        assert_eq!(t.min_value().expect("min"), Some(0.0));

        let mut t = counter();
        t.set_base(5.0).expect("set");
        assert_eq!(t.base().expect("base"), 3.0);
        t.set_base(-5.0).expect("set");
        assert_eq!(t.base().expect("base"), -3.0);
    }

    #[test]
    fn test_counter_reset_current() {
        let mut t = counter();
        t.set_current(2.0).expect("set");
        t.reset_current().expect("reset");
        assert_eq!(t.current().expect("current"), 0.0);
        assert!(t.fill_gauge().is_err());
    }

    #[test]
    fn test_counter_percent_divzero() {
        let mut t = counter();
        t.set_min_value(None).expect("unbound");
        t.set_max_value(None).expect("unbound");
        assert_eq!(t.percent_string().expect("percent"), "100.0%");
        t.set_current(20.0).expect("set");
        assert_eq!(t.current().expect("current"), 20.0);
        assert_eq!(t.percent().expect("percent"), 100.0);
    }

    #[test]
    fn test_gauge_unbounded_above() {
        let mut t = gauge();
        t.set_current(15.0).expect("set");
        assert_eq!(t.current().expect("current"), 15.0);

        t.set_current(-5.0).expect("set");
        assert_eq!(t.current().expect("current"), 0.0);

        t.set_max_value(Some(12.0)).expect("set");
        t.set_current(15.0).expect("set");
        assert_eq!(t.current().expect("current"), 12.0);
    }

    #[test]
    fn test_gauge_buff_raises_current() {
        let mut t = gauge();
        t.set_mod(2.0).expect("buff");
        assert_eq!(t.current().expect("current"), 12.0);
        assert_eq!(t.actual().expect("actual"), 12.0);

        t.reset_mod().expect("reset");
        assert_eq!(t.current().expect("current"), 10.0);

        t.set_current(5.0).expect("set");
        t.set_mod(2.0).expect("buff");
        assert_eq!(t.current().expect("current"), 7.0);
    }

    #[test]
    fn test_gauge_debuff_lowers_current_above_base_plus_mod() {
        let mut t = gauge();
        t.set_mod(-2.0).expect("debuff");
        assert_eq!(t.current().expect("current"), 8.0);

        t.reset_mod().expect("reset");
        t.set_current(5.0).expect("set");
        t.set_mod(-2.0).expect("debuff");
        assert_eq!(t.current().expect("current"), 5.0);
    }

    #[test]
    fn test_gauge_fill_up_to_max() {
        let mut t = gauge();
        t.set_max_value(Some(20.0)).expect("set");
        t.set_current(5.0).expect("set");

        t.fill_gauge().expect("fill");
        // may exceed base + mod
        assert_eq!(t.current().expect("current"), 15.0);

        t.fill_gauge().expect("fill");
        assert_eq!(t.current().expect("current"), 20.0);
    }

    #[test]
    fn test_gauge_fill_unbounded() {
        let mut t = gauge();
        t.set_current(5.0).expect("set");
        t.set_mod(2.0).expect("buff");
        assert_eq!(t.current().expect("current"), 7.0);

        t.fill_gauge().expect("fill");
        assert_eq!(t.current().expect("current"), 19.0);
    }

    #[test]
    fn test_gauge_percent() {
        let mut t = gauge();
        t.set_base(100.0).expect("set");
        t.set_current(69.0).expect("set");
        assert_eq!(t.percent_string().expect("percent"), "69.0%");

        let mut t = gauge();
        t.set_base(30.0).expect("set");
        t.set_mod(3.0).expect("set");
        t.set_max_value(Some(99.0)).expect("set");
        t.set_current(33.0).expect("set");
        assert_eq!(t.percent_string().expect("percent"), "33.3%");
    }

    #[test]
    fn test_gauge_percent_unbounded() {
        let mut t = gauge();
        t.set_base(50.0).expect("set");
        t.set_current(75.0).expect("set");
        assert_eq!(t.current().expect("current"), 75.0);
        assert_eq!(t.percent_string().expect("percent"), "150.0%");
    }

    #[test]
    fn test_delete_numeric_field_resets_default() {
        let mut t = counter();
        t.set_current(2.0).expect("set");
        t.delete("current").expect("delete");
        assert_eq!(t.data().get("current"), Some(&json!(0)));
        t.delete("max_value").expect("delete");
        assert_eq!(t.max_value().expect("max"), None);
    }

    #[test]
    fn test_fractional_values_stored_as_float() {
        let mut t = make(TraitKind::Static, json!({"name": "Speed"}));
        t.set_mod(0.5).expect("set");
        assert_eq!(t.data().get("mod"), Some(&json!(0.5)));
        assert_eq!(t.actual().expect("actual"), 0.5);
    }

    #[test]
    fn test_display() {
        let t = make(TraitKind::Static, json!({"name": "Strength", "base": 8}));
        assert_eq!(t.to_string(), "Strength(test, static): 8");

        let mut t = gauge();
        assert_eq!(t.to_string(), "HP(test, gauge): 10");
        t.set_max_value(Some(20.0)).expect("set");
        assert_eq!(t.to_string(), "HP(test, gauge): 10/20");

        let t = make(TraitKind::Trait, json!({"name": "Mood", "value": "calm"}));
        assert_eq!(t.to_string(), "Mood(test, trait): \"calm\"");
    }
}
