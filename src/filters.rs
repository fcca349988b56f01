//! Filter engine: named optional constraints combined conjunctively into a
//! row subset. Filtering never mutates the shared table; it materializes a
//! new DataFrame whose rows keep their original relative order.

use color_eyre::Result;
use polars::prelude::*;

/// Coarse smoking grouping used by the library-level filtered analysis
/// entry point (the HTTP route filters on `smoking_status` directly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokingGroup {
    /// formerly smoked or smokes
    Smoker,
    /// never smoked
    NonSmoker,
}

/// Optional constraints over the stroke table. `Default` is unconstrained:
/// applying it returns the input table unchanged.
///
/// The age bounds carry the unrestricted defaults 0 and 100 and are only
/// applied when at least one of them differs from its default. The glucose
/// and bmi ranges are applied only when both bounds of the pair are present.
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    pub age_min: f64,
    pub age_max: f64,
    pub gender: Option<String>,
    pub hypertension: Option<i64>,
    pub heart_disease: Option<i64>,
    pub stroke: Option<i64>,
    pub ever_married: Option<String>,
    pub work_type: Option<String>,
    pub residence_type: Option<String>,
    pub smoking_status: Option<String>,
    pub smoking: Option<SmokingGroup>,
    pub glucose_min: Option<f64>,
    pub glucose_max: Option<f64>,
    pub bmi_min: Option<f64>,
    pub bmi_max: Option<f64>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            age_min: 0.0,
            age_max: 100.0,
            gender: None,
            hypertension: None,
            heart_disease: None,
            stroke: None,
            ever_married: None,
            work_type: None,
            residence_type: None,
            smoking_status: None,
            smoking: None,
            glucose_min: None,
            glucose_max: None,
            bmi_min: None,
            bmi_max: None,
        }
    }
}

impl Filters {
    /// True when no constraint would be applied.
    pub fn is_unconstrained(&self) -> bool {
        *self == Filters::default()
    }
}

/// Applies all present constraints conjunctively and returns the row subset.
/// With no constraints the original table is returned (cheap clone; the
/// column buffers are shared, never copied or mutated).
pub fn apply(df: &DataFrame, filters: &Filters) -> Result<DataFrame> {
    let mut mask: Option<BooleanChunked> = None;

    if filters.age_min > 0.0 || filters.age_max < 100.0 {
        and_mask(
            &mut mask,
            range_mask(df, "age", filters.age_min, filters.age_max)?,
        );
    }
    if let Some(gender) = &filters.gender {
        and_mask(&mut mask, str_eq_mask(df, "gender", gender)?);
    }
    if let Some(value) = filters.hypertension {
        and_mask(&mut mask, int_eq_mask(df, "hypertension", value)?);
    }
    if let Some(value) = filters.heart_disease {
        and_mask(&mut mask, int_eq_mask(df, "heart_disease", value)?);
    }
    if let Some(value) = filters.stroke {
        and_mask(&mut mask, int_eq_mask(df, "stroke", value)?);
    }
    if let Some(status) = &filters.ever_married {
        and_mask(&mut mask, str_eq_mask(df, "ever_married", status)?);
    }
    if let Some(work_type) = &filters.work_type {
        and_mask(&mut mask, str_eq_mask(df, "work_type", work_type)?);
    }
    if let Some(residence) = &filters.residence_type {
        and_mask(&mut mask, str_eq_mask(df, "Residence_type", residence)?);
    }
    if let Some(status) = &filters.smoking_status {
        and_mask(&mut mask, str_eq_mask(df, "smoking_status", status)?);
    }
    if let Some(group) = filters.smoking {
        let allowed: &[&str] = match group {
            SmokingGroup::Smoker => &["formerly smoked", "smokes"],
            SmokingGroup::NonSmoker => &["never smoked"],
        };
        and_mask(&mut mask, str_in_mask(df, "smoking_status", allowed)?);
    }
    if let (Some(lo), Some(hi)) = (filters.glucose_min, filters.glucose_max) {
        and_mask(&mut mask, range_mask(df, "avg_glucose_level", lo, hi)?);
    }
    if let (Some(lo), Some(hi)) = (filters.bmi_min, filters.bmi_max) {
        and_mask(&mut mask, range_mask(df, "bmi", lo, hi)?);
    }

    match mask {
        Some(mask) => Ok(df.filter(&mask)?),
        None => Ok(df.clone()),
    }
}

fn and_mask(acc: &mut Option<BooleanChunked>, next: BooleanChunked) {
    *acc = Some(match acc.take() {
        Some(current) => &current & &next,
        None => next,
    });
}

/// Inclusive range test on a Float64 column. Null entries never match.
fn range_mask(df: &DataFrame, name: &str, lo: f64, hi: f64) -> Result<BooleanChunked> {
    let values = df.column(name)?.as_materialized_series().f64()?;
    Ok(values
        .iter()
        .map(|v| Some(v.is_some_and(|x| x >= lo && x <= hi)))
        .collect())
}

fn str_eq_mask(df: &DataFrame, name: &str, want: &str) -> Result<BooleanChunked> {
    let values = df.column(name)?.as_materialized_series().str()?;
    Ok(values
        .iter()
        .map(|v| Some(v.is_some_and(|x| x == want)))
        .collect())
}

fn str_in_mask(df: &DataFrame, name: &str, allowed: &[&str]) -> Result<BooleanChunked> {
    let values = df.column(name)?.as_materialized_series().str()?;
    Ok(values
        .iter()
        .map(|v| Some(v.is_some_and(|x| allowed.contains(&x))))
        .collect())
}

fn int_eq_mask(df: &DataFrame, name: &str, want: i64) -> Result<BooleanChunked> {
    let values = df.column(name)?.as_materialized_series().i64()?;
    Ok(values
        .iter()
        .map(|v| Some(v.is_some_and(|x| x == want)))
        .collect())
}
