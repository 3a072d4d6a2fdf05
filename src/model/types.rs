use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Customer {
    #[serde(rename = "AWS")]
    Aws,
    #[serde(rename = "Lab")]
    Lab,
}

impl Customer {
    /// All customers, in display order.
    pub const ALL: [Customer; 2] = [Customer::Aws, Customer::Lab];

    pub fn name(&self) -> &'static str {
        match self {
            Customer::Aws => "AWS",
            Customer::Lab => "Lab",
        }
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Customer {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "aws" => Ok(Customer::Aws),
            "lab" => Ok(Customer::Lab),
            _ => bail!("Unknown customer '{}' (expected one of: AWS, Lab)", s.trim()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Search,
    Export,
    #[serde(rename = "Change management")]
    ChangeManagement,
}

impl Feature {
    /// All features, in display order.
    pub const ALL: [Feature; 3] = [Feature::Search, Feature::Export, Feature::ChangeManagement];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Search => "Search",
            Feature::Export => "Export",
            Feature::ChangeManagement => "Change management",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "search" => Ok(Feature::Search),
            "export" => Ok(Feature::Export),
            "changemanagement" | "change" => Ok(Feature::ChangeManagement),
            _ => bail!(
                "Unknown feature '{}' (expected one of: Search, Export, Change management)",
                s.trim()
            ),
        }
    }
}

/// Lowercase and drop separators so "Change management", "change-management"
/// and "change_management" all compare equal.
fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// One value per feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureMap<T> {
    #[serde(rename = "Search")]
    pub search: T,
    #[serde(rename = "Export")]
    pub export: T,
    #[serde(rename = "Change management")]
    pub change_management: T,
}

impl<T> FeatureMap<T> {
    pub fn new(search: T, export: T, change_management: T) -> Self {
        Self {
            search,
            export,
            change_management,
        }
    }

    /// Build a map by evaluating `f` once per feature.
    pub fn from_fn(mut f: impl FnMut(Feature) -> T) -> Self {
        Self {
            search: f(Feature::Search),
            export: f(Feature::Export),
            change_management: f(Feature::ChangeManagement),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Feature, &T) -> U) -> FeatureMap<U> {
        FeatureMap::from_fn(|feat| f(feat, &self[feat]))
    }

    /// Iterate `(feature, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, &T)> {
        Feature::ALL.into_iter().map(move |f| (f, &self[f]))
    }
}

impl FeatureMap<f64> {
    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, v)| *v).sum()
    }
}

impl<T> Index<Feature> for FeatureMap<T> {
    type Output = T;

    fn index(&self, feature: Feature) -> &T {
        match feature {
            Feature::Search => &self.search,
            Feature::Export => &self.export,
            Feature::ChangeManagement => &self.change_management,
        }
    }
}

impl<T> IndexMut<Feature> for FeatureMap<T> {
    fn index_mut(&mut self, feature: Feature) -> &mut T {
        match feature {
            Feature::Search => &mut self.search,
            Feature::Export => &mut self.export,
            Feature::ChangeManagement => &mut self.change_management,
        }
    }
}

/// One value per customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerCustomer<T> {
    #[serde(rename = "AWS")]
    pub aws: T,
    #[serde(rename = "Lab")]
    pub lab: T,
}

impl<T> PerCustomer<T> {
    pub fn new(aws: T, lab: T) -> Self {
        Self { aws, lab }
    }

    pub fn from_fn(mut f: impl FnMut(Customer) -> T) -> Self {
        Self {
            aws: f(Customer::Aws),
            lab: f(Customer::Lab),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Customer, &T) -> U) -> PerCustomer<U> {
        PerCustomer::from_fn(|c| f(c, &self[c]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Customer, &T)> {
        Customer::ALL.into_iter().map(move |c| (c, &self[c]))
    }
}

impl<T> Index<Customer> for PerCustomer<T> {
    type Output = T;

    fn index(&self, customer: Customer) -> &T {
        match customer {
            Customer::Aws => &self.aws,
            Customer::Lab => &self.lab,
        }
    }
}

impl<T> IndexMut<Customer> for PerCustomer<T> {
    fn index_mut(&mut self, customer: Customer) -> &mut T {
        match customer {
            Customer::Aws => &mut self.aws,
            Customer::Lab => &mut self.lab,
        }
    }
}

/// Survey-measured satisfaction per feature, in [0, 1].
pub type FeatureScoreMap = FeatureMap<f64>;
/// Raw usage telemetry per feature.
pub type UsageMap = FeatureMap<u64>;
/// Normalized feature importance; entries sum to 1 for non-degenerate input.
pub type WeightMap = FeatureMap<f64>;
/// Hypothetical per-feature perturbations. `None` leaves the score untouched.
pub type DeltaMap = PerCustomer<FeatureMap<Option<f64>>>;

/// Everything the engine needs for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    pub feature_scores: PerCustomer<FeatureScoreMap>,
    pub overall: PerCustomer<f64>,
    pub usage: PerCustomer<UsageMap>,
    /// Usage emphasis: 0 ignores usage, 1 is linear, >1 is super-linear.
    pub alpha: f64,
}

impl Inputs {
    /// Reference survey and telemetry figures, alpha = 1.0.
    pub fn seed() -> Self {
        Self {
            feature_scores: PerCustomer::new(
                FeatureMap::new(0.674, 0.562, 0.644),
                FeatureMap::new(0.740, 0.724, 0.803),
            ),
            overall: PerCustomer::new(0.602, 0.816),
            usage: PerCustomer::new(
                FeatureMap::new(4722, 253, 2662),
                FeatureMap::new(1289, 181, 2069),
            ),
            alpha: 1.0,
        }
    }

    pub fn with_alpha(&self, alpha: f64) -> Self {
        Self {
            alpha,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub weights: PerCustomer<WeightMap>,
    pub intercept: PerCustomer<f64>,
}

/// Current vs. predicted overall for one customer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub now: f64,
    pub pred: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub weights: PerCustomer<WeightMap>,
    pub intercept: PerCustomer<f64>,
    pub result: PerCustomer<Outcome>,
}
