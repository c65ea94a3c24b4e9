//! Per-stage option types.
//!
//! Every type here validates itself while being deserialized, so a
//! [`ValidationConfig`](super::ValidationConfig) that parsed successfully
//! never carries an unsupported strategy, method, type or pattern.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dataset::{ColumnType, Value};

/// Which row of a duplicate group survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepPolicy {
    /// Keep the first occurrence.
    #[default]
    First,
    /// Keep the last occurrence.
    Last,
    /// Drop every member of the group.
    None,
}

impl KeepPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeepPolicy::First => "first",
            KeepPolicy::Last => "last",
            KeepPolicy::None => "none",
        }
    }
}

/// Options for the duplicate stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateOptions {
    /// Columns forming the duplicate key (all columns when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset: Option<Vec<String>>,

    /// Which member of a duplicate group to keep.
    #[serde(default)]
    pub keep: KeepPolicy,
}

impl DuplicateOptions {
    /// Duplicates over the given key columns, keeping the first occurrence.
    pub fn on<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subset: Some(columns.into_iter().map(Into::into).collect()),
            keep: KeepPolicy::First,
        }
    }

    /// Set the keep policy.
    pub fn with_keep(mut self, keep: KeepPolicy) -> Self {
        self.keep = keep;
        self
    }
}

/// How to remediate nulls in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNullRule", into = "RawNullRule")]
pub enum NullStrategy {
    /// Remove every row where the column is null.
    DropRow,
    /// Fill with the mean of the non-null numeric values.
    FillMean,
    /// Fill with the median of the non-null numeric values.
    FillMedian,
    /// Fill with the most frequent non-null value.
    FillMode,
    /// Propagate the nearest preceding non-null value.
    FillForward,
    /// Propagate the nearest following non-null value.
    FillBackward,
    /// Fill with a constant.
    FillValue(Value),
}

impl NullStrategy {
    /// Name used in configuration files and issue records.
    pub fn name(&self) -> &'static str {
        match self {
            NullStrategy::DropRow => "drop_row",
            NullStrategy::FillMean => "fill_mean",
            NullStrategy::FillMedian => "fill_median",
            NullStrategy::FillMode => "fill_mode",
            NullStrategy::FillForward => "fill_forward",
            NullStrategy::FillBackward => "fill_backward",
            NullStrategy::FillValue(_) => "fill_value",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let strategy = match name {
            "drop_row" | "drop_rows" => NullStrategy::DropRow,
            "fill_mean" => NullStrategy::FillMean,
            "fill_median" => NullStrategy::FillMedian,
            "fill_mode" => NullStrategy::FillMode,
            "fill_forward" | "ffill" => NullStrategy::FillForward,
            "fill_backward" | "bfill" => NullStrategy::FillBackward,
            _ => return None,
        };
        Some(strategy)
    }
}

impl fmt::Display for NullStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wire form: `"fill_median"`, `{"strategy": "fill_value", "value": 0}` or `{"fill_value": 0}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawNullRule {
    Name(String),
    Rule {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        strategy: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill_value: Option<serde_json::Value>,
    },
}

impl TryFrom<RawNullRule> for NullStrategy {
    type Error = String;

    fn try_from(raw: RawNullRule) -> Result<Self, Self::Error> {
        let unsupported = |name: &str| {
            format!(
                "unsupported null strategy '{}' (expected drop_row, fill_mean, fill_median, \
                 fill_mode, fill_forward, fill_backward or fill_value)",
                name
            )
        };

        match raw {
            RawNullRule::Name(name) if name == "fill_value" => {
                Err("strategy 'fill_value' requires a 'value'".to_string())
            }
            RawNullRule::Name(name) => {
                NullStrategy::from_name(&name).ok_or_else(|| unsupported(&name))
            }
            RawNullRule::Rule {
                strategy,
                value,
                fill_value,
            } => {
                let constant = value.or(fill_value).filter(|v| !v.is_null());
                match strategy.as_deref() {
                    Some("fill_value") | None => constant
                        .map(|v| NullStrategy::FillValue(Value::from(&v)))
                        .ok_or_else(|| "strategy 'fill_value' requires a 'value'".to_string()),
                    Some(name) => NullStrategy::from_name(name).ok_or_else(|| unsupported(name)),
                }
            }
        }
    }
}

impl From<NullStrategy> for RawNullRule {
    fn from(strategy: NullStrategy) -> Self {
        match strategy {
            NullStrategy::FillValue(value) => RawNullRule::Rule {
                strategy: Some("fill_value".to_string()),
                value: Some(serde_json::to_value(&value).unwrap_or_default()),
                fill_value: None,
            },
            other => RawNullRule::Name(other.name().to_string()),
        }
    }
}

/// Target type for the type-validation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    #[serde(alias = "integer")]
    Int,
    #[serde(alias = "double", alias = "number")]
    Float,
    #[serde(alias = "str", alias = "text")]
    String,
    #[serde(alias = "date", alias = "timestamp")]
    DateTime,
    #[serde(alias = "boolean")]
    Bool,
}

impl TargetType {
    /// Column type produced by casting to this target.
    pub fn column_type(&self) -> ColumnType {
        match self {
            TargetType::Int => ColumnType::Integer,
            TargetType::Float => ColumnType::Float,
            TargetType::String => ColumnType::String,
            TargetType::DateTime => ColumnType::DateTime,
            TargetType::Bool => ColumnType::Boolean,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Int => "int",
            TargetType::Float => "float",
            TargetType::String => "string",
            TargetType::DateTime => "datetime",
            TargetType::Bool => "bool",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive numeric bounds for one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRangeRule", into = "RawRangeRule")]
pub struct RangeRule {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeRule {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// Check that the bounds are numbers and not inverted.
    pub fn validate(&self) -> Result<(), String> {
        if self.min.is_some_and(f64::is_nan) || self.max.is_some_and(f64::is_nan) {
            return Err("range bounds must be numbers".to_string());
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(format!("range min ({}) is greater than max ({})", min, max));
            }
        }
        Ok(())
    }

    /// Whether a numeric value falls outside the bounds.
    pub fn violates(&self, value: f64) -> bool {
        self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawRangeRule {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

impl TryFrom<RawRangeRule> for RangeRule {
    type Error = String;

    fn try_from(raw: RawRangeRule) -> Result<Self, Self::Error> {
        let rule = RangeRule::new(raw.min, raw.max);
        rule.validate()?;
        Ok(rule)
    }
}

impl From<RangeRule> for RawRangeRule {
    fn from(rule: RangeRule) -> Self {
        RawRangeRule {
            min: rule.min,
            max: rule.max,
        }
    }
}

/// A regular expression every non-null value must match.
///
/// The regex is compiled when the rule is built; matching is an unanchored
/// search, so patterns carry their own `^`/`$` anchors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPatternRule", into = "RawPatternRule")]
pub struct PatternRule {
    pattern: String,
    regex: Regex,
}

impl PatternRule {
    /// Compile a pattern rule.
    pub fn new(pattern: impl Into<String>) -> Result<Self, regex::Error> {
        let pattern = pattern.into();
        let regex = Regex::new(&pattern)?;
        Ok(Self { pattern, regex })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for PatternRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPatternRule {
    Rule { pattern: String },
    Bare(String),
}

impl TryFrom<RawPatternRule> for PatternRule {
    type Error = String;

    fn try_from(raw: RawPatternRule) -> Result<Self, Self::Error> {
        let pattern = match raw {
            RawPatternRule::Rule { pattern } | RawPatternRule::Bare(pattern) => pattern,
        };
        PatternRule::new(pattern.as_str())
            .map_err(|e| format!("invalid pattern '{}': {}", pattern, e))
    }
}

impl From<PatternRule> for RawPatternRule {
    fn from(rule: PatternRule) -> Self {
        RawPatternRule::Rule {
            pattern: rule.pattern,
        }
    }
}

/// Statistical method for outlier detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlierMethod {
    /// Interquartile-range fences.
    #[default]
    #[serde(rename = "iqr")]
    Iqr,
    /// Distance from the mean in sample standard deviations.
    #[serde(rename = "zscore", alias = "z_score", alias = "z-score")]
    ZScore,
}

impl OutlierMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutlierMethod::Iqr => "iqr",
            OutlierMethod::ZScore => "zscore",
        }
    }

    /// Threshold used when the rule does not set one.
    pub fn default_threshold(&self) -> f64 {
        match self {
            OutlierMethod::Iqr => 1.5,
            OutlierMethod::ZScore => 3.0,
        }
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outlier detection options for one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOutlierRule", into = "RawOutlierRule")]
pub struct OutlierRule {
    pub method: OutlierMethod,
    /// IQR multiplier or z-score cutoff; the method default when absent.
    pub threshold: Option<f64>,
}

impl OutlierRule {
    pub fn iqr() -> Self {
        Self {
            method: OutlierMethod::Iqr,
            threshold: None,
        }
    }

    pub fn zscore() -> Self {
        Self {
            method: OutlierMethod::ZScore,
            threshold: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Check that an explicit threshold is a positive number.
    pub fn validate(&self) -> Result<(), String> {
        match self.threshold {
            Some(threshold) if !threshold.is_finite() || threshold <= 0.0 => Err(format!(
                "outlier threshold must be a positive number, got {}",
                threshold
            )),
            _ => Ok(()),
        }
    }

    /// The threshold in effect for this rule.
    pub fn effective_threshold(&self) -> f64 {
        self.threshold
            .unwrap_or_else(|| self.method.default_threshold())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawOutlierRule {
    #[serde(default)]
    method: OutlierMethod,
    #[serde(default, alias = "multiplier", skip_serializing_if = "Option::is_none")]
    threshold: Option<f64>,
}

impl TryFrom<RawOutlierRule> for OutlierRule {
    type Error = String;

    fn try_from(raw: RawOutlierRule) -> Result<Self, Self::Error> {
        let rule = OutlierRule {
            method: raw.method,
            threshold: raw.threshold,
        };
        rule.validate()?;
        Ok(rule)
    }
}

impl From<OutlierRule> for RawOutlierRule {
    fn from(rule: OutlierRule) -> Self {
        RawOutlierRule {
            method: rule.method,
            threshold: rule.threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_strategy_shorthand_and_alias() {
        let s: NullStrategy = serde_json::from_value(json!("fill_median")).unwrap();
        assert_eq!(s, NullStrategy::FillMedian);

        let s: NullStrategy = serde_json::from_value(json!("drop_rows")).unwrap();
        assert_eq!(s, NullStrategy::DropRow);

        let s: NullStrategy = serde_json::from_value(json!({"strategy": "fill_forward"})).unwrap();
        assert_eq!(s, NullStrategy::FillForward);
    }

    #[test]
    fn test_null_strategy_fill_value() {
        let s: NullStrategy =
            serde_json::from_value(json!({"strategy": "fill_value", "value": "unknown"})).unwrap();
        assert_eq!(s, NullStrategy::FillValue(Value::from("unknown")));

        let s: NullStrategy = serde_json::from_value(json!({"fill_value": 0})).unwrap();
        assert_eq!(s, NullStrategy::FillValue(Value::Int(0)));

        assert!(serde_json::from_value::<NullStrategy>(json!("fill_value")).is_err());
        assert!(serde_json::from_value::<NullStrategy>(json!({"strategy": "fill_value"})).is_err());
    }

    #[test]
    fn test_null_strategy_rejects_unknown() {
        let err = serde_json::from_value::<NullStrategy>(json!("interpolate")).unwrap_err();
        assert!(err.to_string().contains("interpolate"));
    }

    #[test]
    fn test_null_strategy_serializes_by_name() {
        assert_eq!(
            serde_json::to_value(NullStrategy::FillMean).unwrap(),
            json!("fill_mean")
        );
        assert_eq!(
            serde_json::to_value(NullStrategy::FillValue(Value::Int(7))).unwrap(),
            json!({"strategy": "fill_value", "value": 7})
        );
    }

    #[test]
    fn test_target_type_names() {
        let t: TargetType = serde_json::from_value(json!("datetime")).unwrap();
        assert_eq!(t, TargetType::DateTime);
        let t: TargetType = serde_json::from_value(json!("integer")).unwrap();
        assert_eq!(t, TargetType::Int);
        assert_eq!(TargetType::Bool.column_type(), ColumnType::Boolean);
        assert!(serde_json::from_value::<TargetType>(json!("decimal")).is_err());
    }

    #[test]
    fn test_range_rule() {
        let r: RangeRule = serde_json::from_value(json!({"min": 0, "max": 120})).unwrap();
        assert!(r.violates(150.0));
        assert!(r.violates(-1.0));
        assert!(!r.violates(120.0));

        let open: RangeRule = serde_json::from_value(json!({"min": 0})).unwrap();
        assert!(!open.violates(1e12));

        assert!(serde_json::from_value::<RangeRule>(json!({"min": 10, "max": 1})).is_err());
    }

    #[test]
    fn test_pattern_rule_compiles() {
        let p: PatternRule = serde_json::from_value(json!({"pattern": "^[a-z]+$"})).unwrap();
        assert!(p.is_match("abc"));
        assert!(!p.is_match("ABC"));

        let err =
            serde_json::from_value::<PatternRule>(json!({"pattern": "(unclosed"})).unwrap_err();
        assert!(err.to_string().contains("invalid pattern"));
    }

    #[test]
    fn test_outlier_rule_defaults_and_alias() {
        let r: OutlierRule = serde_json::from_value(json!({"method": "iqr"})).unwrap();
        assert_eq!(r.effective_threshold(), 1.5);

        let r: OutlierRule = serde_json::from_value(json!({"method": "zscore"})).unwrap();
        assert_eq!(r.effective_threshold(), 3.0);

        let r: OutlierRule =
            serde_json::from_value(json!({"method": "iqr", "multiplier": 3})).unwrap();
        assert_eq!(r.effective_threshold(), 3.0);

        assert!(
            serde_json::from_value::<OutlierRule>(json!({"method": "isolation_forest"})).is_err()
        );
        assert!(serde_json::from_value::<OutlierRule>(json!({"threshold": -1})).is_err());
    }

    #[test]
    fn test_programmatic_rules_validate() {
        assert!(RangeRule::between(0.0, 120.0).validate().is_ok());
        assert!(RangeRule::new(Some(5.0), None).validate().is_ok());
        assert!(RangeRule::between(3.0, 2.0).validate().is_err());
        assert!(RangeRule::new(Some(f64::NAN), None).validate().is_err());

        assert!(OutlierRule::zscore().validate().is_ok());
        assert!(OutlierRule::iqr().with_threshold(3.0).validate().is_ok());
        assert!(OutlierRule::zscore().with_threshold(-1.0).validate().is_err());
        assert!(OutlierRule::iqr().with_threshold(0.0).validate().is_err());
        assert!(OutlierRule::iqr().with_threshold(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_keep_policy_default() {
        let d: DuplicateOptions = serde_json::from_value(json!({"subset": ["id"]})).unwrap();
        assert_eq!(d.keep, KeepPolicy::First);
        assert!(serde_json::from_value::<DuplicateOptions>(json!({"keep": "middle"})).is_err());
    }
}
