//! Analysis library for the stroke table: descriptive statistics, bivariate
//! associations, and the aggregate composition served by the dashboard
//! routes.
//!
//! Every function takes a table (full or already filtered), reads it without
//! mutation, and returns an explicit result struct. Rounded outputs use
//! round-half-to-even at the stated number of fractional digits. Every mean,
//! rate, and ratio is defined on empty or degenerate input (it yields 0.0,
//! never NaN and never a panic), so an empty filtered subset serializes to
//! all-zero summaries.

use crate::dataset::non_null_f64;
use crate::filters::{self, Filters};
use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;

/// Numeric columns summarized throughout the module.
const NUMERIC_COLUMNS: [&str; 3] = ["age", "avg_glucose_level", "bmi"];

/// Correlation matrix columns, in output order.
const CORRELATION_COLUMNS: [&str; 4] = ["age", "avg_glucose_level", "bmi", "stroke"];

/// Glucose bands (mg/dL), half-open [low, high).
const GLUCOSE_BANDS: [(&str, f64, f64); 5] = [
    ("Hypoglycémie", 0.0, 70.0),
    ("Normal", 70.0, 100.0),
    ("Pré-diabète", 100.0, 125.0),
    ("Diabète", 125.0, 200.0),
    ("Diabète sévère", 200.0, 300.0),
];

/// BMI bands (kg/m²), half-open [low, high).
const BMI_BANDS: [(&str, f64, f64); 6] = [
    ("Sous-poids", 0.0, 18.5),
    ("Normal", 18.5, 25.0),
    ("Surpoids", 25.0, 30.0),
    ("Obésité I", 30.0, 35.0),
    ("Obésité II", 35.0, 40.0),
    ("Obésité III", 40.0, 100.0),
];

const GENDER_LABELS: &[(&str, &str)] = &[("Male", "Homme"), ("Female", "Femme"), ("Other", "Autre")];
const MARRIED_LABELS: &[(&str, &str)] = &[("Yes", "Marié(e)"), ("No", "Célibataire")];
const WORK_TYPE_LABELS: &[(&str, &str)] = &[
    ("Private", "Privé"),
    ("Self-employed", "Indépendant"),
    ("Govt_job", "Fonctionnaire"),
    ("children", "Enfant"),
    ("Never_worked", "Jamais travaillé"),
];
const RESIDENCE_LABELS: &[(&str, &str)] = &[("Urban", "Urbain"), ("Rural", "Rural")];
const SMOKING_LABELS: &[(&str, &str)] = &[
    ("formerly smoked", "Ancien fumeur"),
    ("never smoked", "Jamais fumé"),
    ("smokes", "Fumeur actuel"),
    ("Unknown", "Inconnu"),
];
const BINARY_LABELS: &[(i64, &str)] = &[(0, "Non"), (1, "Oui")];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_records: usize,
    pub stroke_cases: usize,
    pub non_stroke_cases: usize,
    pub stroke_percentage: f64,
    pub avg_age: f64,
    pub avg_glucose: f64,
    pub avg_bmi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeGroupValues {
    #[serde(rename = "0")]
    pub no_stroke: f64,
    #[serde(rename = "1")]
    pub stroke: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeGroupCounts {
    #[serde(rename = "0")]
    pub no_stroke: usize,
    #[serde(rename = "1")]
    pub stroke: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeDistribution {
    pub counts: StrokeGroupCounts,
    pub percentages: StrokeGroupValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeDistribution {
    pub stroke: Vec<f64>,
    pub no_stroke: Vec<f64>,
    pub stroke_hist: Vec<usize>,
    pub no_stroke_hist: Vec<usize>,
    pub bins: Vec<String>,
    pub stroke_mean: f64,
    pub no_stroke_mean: f64,
}

/// One category of a grouped categorical column, with its display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub value: String,
    pub total: usize,
    pub stroke_count: usize,
    /// Fraction of the group with stroke == 1, not a percentage.
    pub stroke_rate: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalDistributions {
    pub gender: Vec<CategoryBreakdown>,
    pub hypertension: Vec<CategoryBreakdown>,
    pub heart_disease: Vec<CategoryBreakdown>,
    pub ever_married: Vec<CategoryBreakdown>,
    pub work_type: Vec<CategoryBreakdown>,
    #[serde(rename = "Residence_type")]
    pub residence_type: Vec<CategoryBreakdown>,
    pub smoking_status: Vec<CategoryBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericalSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
    pub stroke_mean: f64,
    pub no_stroke_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericalDistributions {
    pub age: NumericalSummary,
    pub glucose: NumericalSummary,
    pub bmi: NumericalSummary,
}

/// Pearson correlation matrix: `values[i][j]` correlates `columns[i]` with
/// `columns[j]`. Symmetric with a unit diagonal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature_name: String,
    pub correlation: f64,
    pub effect_size: f64,
    pub importance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlucoseBand {
    pub category: String,
    pub total: usize,
    pub stroke_count: usize,
    /// Stroke rate within the band, as a percentage.
    pub stroke_rate: f64,
    pub avg_glucose: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BmiBand {
    pub category: String,
    pub total: usize,
    pub stroke_count: usize,
    /// Stroke rate within the band, as a percentage.
    pub stroke_rate: f64,
    pub avg_bmi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericComparison {
    pub stroke_mean: f64,
    pub no_stroke_mean: f64,
    pub difference: f64,
    pub pct_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryComparison {
    pub stroke_rate_with: f64,
    pub stroke_rate_without: f64,
    pub risk_ratio: f64,
    pub risk_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactorComparison {
    pub age: NumericComparison,
    pub avg_glucose_level: NumericComparison,
    pub bmi: NumericComparison,
    pub hypertension: BinaryComparison,
    pub heart_disease: BinaryComparison,
}

/// The canonical aggregate served by both analysis routes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedAnalysis {
    pub overview: Overview,
    pub stroke_distribution: StrokeDistribution,
    pub age_distribution: AgeDistribution,
    pub categorical_distributions: CategoricalDistributions,
    pub numerical_distributions: NumericalDistributions,
    pub correlation: CorrelationMatrix,
    pub feature_importance: Vec<FeatureImportance>,
    pub glucose_categories: Vec<GlucoseBand>,
    pub bmi_categories: Vec<BmiBand>,
    pub risk_factor_comparison: RiskFactorComparison,
}

/// Overall dataset counts and means. All zeros for an empty table.
pub fn overview(df: &DataFrame) -> Result<Overview> {
    let total = df.height();
    if total == 0 {
        return Ok(Overview {
            total_records: 0,
            stroke_cases: 0,
            non_stroke_cases: 0,
            stroke_percentage: 0.0,
            avg_age: 0.0,
            avg_glucose: 0.0,
            avg_bmi: 0.0,
        });
    }
    let (stroke_cases, non_stroke_cases) = stroke_counts(df)?;
    Ok(Overview {
        total_records: total,
        stroke_cases,
        non_stroke_cases,
        stroke_percentage: round_to(stroke_cases as f64 / total as f64 * 100.0, 2),
        avg_age: round_to(mean(&non_null_f64(df, "age")?), 1),
        avg_glucose: round_to(mean(&non_null_f64(df, "avg_glucose_level")?), 1),
        avg_bmi: round_to(mean(&non_null_f64(df, "bmi")?), 1),
    })
}

/// Counts and percentages per stroke group. A missing group counts as zero;
/// an empty table yields zero percentages.
pub fn stroke_distribution(df: &DataFrame) -> Result<StrokeDistribution> {
    let (stroke, no_stroke) = stroke_counts(df)?;
    let total = stroke + no_stroke;
    let percentages = if total == 0 {
        StrokeGroupValues {
            no_stroke: 0.0,
            stroke: 0.0,
        }
    } else {
        StrokeGroupValues {
            no_stroke: round_to(no_stroke as f64 / total as f64 * 100.0, 2),
            stroke: round_to(stroke as f64 / total as f64 * 100.0, 2),
        }
    };
    Ok(StrokeDistribution {
        counts: StrokeGroupCounts { no_stroke, stroke },
        percentages,
    })
}

/// Raw ages and fixed-width histograms per stroke group. Bin edges are
/// [0,20) [20,40) [40,60) [60,80) [80,100], the final bin closed.
pub fn age_distribution(df: &DataFrame) -> Result<AgeDistribution> {
    const EDGES: [f64; 6] = [0.0, 20.0, 40.0, 60.0, 80.0, 100.0];
    let (stroke_ages, no_stroke_ages) = split_by_stroke(df, "age")?;
    Ok(AgeDistribution {
        stroke_hist: histogram(&stroke_ages, &EDGES),
        no_stroke_hist: histogram(&no_stroke_ages, &EDGES),
        bins: ["0-20", "21-40", "41-60", "61-80", "81+"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        stroke_mean: round_to(mean(&stroke_ages), 1),
        no_stroke_mean: round_to(mean(&no_stroke_ages), 1),
        stroke: stroke_ages,
        no_stroke: no_stroke_ages,
    })
}

/// Per-category totals, stroke counts, and stroke rates for the seven fixed
/// categorical columns, with French display labels. Unmapped raw values fall
/// back to their string form.
pub fn categorical_distributions(df: &DataFrame) -> Result<CategoricalDistributions> {
    Ok(CategoricalDistributions {
        gender: breakdown_str(df, "gender", GENDER_LABELS)?,
        hypertension: breakdown_int(df, "hypertension", BINARY_LABELS)?,
        heart_disease: breakdown_int(df, "heart_disease", BINARY_LABELS)?,
        ever_married: breakdown_str(df, "ever_married", MARRIED_LABELS)?,
        work_type: breakdown_str(df, "work_type", WORK_TYPE_LABELS)?,
        residence_type: breakdown_str(df, "Residence_type", RESIDENCE_LABELS)?,
        smoking_status: breakdown_str(df, "smoking_status", SMOKING_LABELS)?,
    })
}

/// Descriptive statistics for the three numeric columns, plus per-stroke-group
/// means. Quartiles use linear interpolation on the sorted values.
pub fn numerical_distributions(df: &DataFrame) -> Result<NumericalDistributions> {
    Ok(NumericalDistributions {
        age: numerical_summary(df, "age")?,
        glucose: numerical_summary(df, "avg_glucose_level")?,
        bmi: numerical_summary(df, "bmi")?,
    })
}

/// Pearson correlation matrix over age, glucose, bmi, and the stroke label,
/// rounded to 3 decimals. Diagonal entries are exactly 1.0; degenerate pairs
/// (constant column, fewer than two rows) report 0.0.
pub fn correlation_analysis(df: &DataFrame) -> Result<CorrelationMatrix> {
    let n = CORRELATION_COLUMNS.len();
    let mut values = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let (xs, ys) = column_pair(df, CORRELATION_COLUMNS[i], CORRELATION_COLUMNS[j])?;
            let correlation = round_to(pearson(&xs, &ys), 3);
            values[i][j] = correlation;
            values[j][i] = correlation;
        }
    }
    Ok(CorrelationMatrix {
        columns: CORRELATION_COLUMNS.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

/// Composite importance per risk factor, sorted descending by score. Numeric
/// features pair Pearson correlation with a pooled-standard-deviation
/// standardized mean difference; binary features pair point-biserial
/// correlation with the risk difference between feature groups. The score is
/// clamp(0, 100, |correlation|·80 + |effect|·20), so it always lands in
/// [0, 100] for finite input.
pub fn feature_importance(df: &DataFrame) -> Result<Vec<FeatureImportance>> {
    let mut items = Vec::with_capacity(5);
    for feature in NUMERIC_COLUMNS {
        let (xs, ys) = column_pair(df, feature, "stroke")?;
        let correlation = pearson(&xs, &ys);
        let (with_stroke, without_stroke) = partition_by_label(&xs, &ys);
        let pooled = pooled_std(&with_stroke, &without_stroke);
        let effect_size = if pooled > 0.0 {
            (mean(&with_stroke) - mean(&without_stroke)) / pooled
        } else {
            0.0
        };
        items.push(importance_item(feature, correlation, effect_size));
    }
    for feature in ["hypertension", "heart_disease"] {
        let (xs, ys) = column_pair(df, feature, "stroke")?;
        let correlation = pearson(&xs, &ys);
        let rate_with = mean_where(&ys, &xs, 1.0);
        let rate_without = mean_where(&ys, &xs, 0.0);
        items.push(importance_item(feature, correlation, rate_with - rate_without));
    }
    // Stable sort keeps declaration order on ties.
    items.sort_by(|a, b| {
        b.importance_score
            .partial_cmp(&a.importance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(items)
}

/// Fixed half-open glucose bands with per-band stroke rates. Empty bands
/// report zero counts and the band midpoint as the mean.
pub fn glucose_categories(df: &DataFrame) -> Result<Vec<GlucoseBand>> {
    let pairs = value_stroke_pairs(df, "avg_glucose_level")?;
    Ok(GLUCOSE_BANDS
        .iter()
        .map(|&(category, lo, hi)| {
            let band = band_summary(&pairs, lo, hi);
            GlucoseBand {
                category: category.to_string(),
                total: band.total,
                stroke_count: band.stroke_count,
                stroke_rate: band.stroke_rate,
                avg_glucose: band.mean,
            }
        })
        .collect())
}

/// Fixed half-open BMI bands with per-band stroke rates. Empty bands report
/// zero counts and the band midpoint as the mean.
pub fn bmi_categories(df: &DataFrame) -> Result<Vec<BmiBand>> {
    let pairs = value_stroke_pairs(df, "bmi")?;
    Ok(BMI_BANDS
        .iter()
        .map(|&(category, lo, hi)| {
            let band = band_summary(&pairs, lo, hi);
            BmiBand {
                category: category.to_string(),
                total: band.total,
                stroke_count: band.stroke_count,
                stroke_rate: band.stroke_rate,
                avg_bmi: band.mean,
            }
        })
        .collect())
}

/// Stroke-group versus non-stroke-group comparison for the numeric factors,
/// and with-versus-without rates for the binary factors.
pub fn risk_factor_comparison(df: &DataFrame) -> Result<RiskFactorComparison> {
    Ok(RiskFactorComparison {
        age: numeric_comparison(df, "age")?,
        avg_glucose_level: numeric_comparison(df, "avg_glucose_level")?,
        bmi: numeric_comparison(df, "bmi")?,
        hypertension: binary_comparison(df, "hypertension")?,
        heart_disease: binary_comparison(df, "heart_disease")?,
    })
}

/// The full aggregate: every analysis function composed under its name.
pub fn detailed_analysis(df: &DataFrame) -> Result<DetailedAnalysis> {
    Ok(DetailedAnalysis {
        overview: overview(df)?,
        stroke_distribution: stroke_distribution(df)?,
        age_distribution: age_distribution(df)?,
        categorical_distributions: categorical_distributions(df)?,
        numerical_distributions: numerical_distributions(df)?,
        correlation: correlation_analysis(df)?,
        feature_importance: feature_importance(df)?,
        glucose_categories: glucose_categories(df)?,
        bmi_categories: bmi_categories(df)?,
        risk_factor_comparison: risk_factor_comparison(df)?,
    })
}

/// Applies the filter engine, then computes the full aggregate over the
/// subset. With default (unconstrained) filters this equals
/// `detailed_analysis` exactly.
pub fn filtered_analysis(df: &DataFrame, filters: &Filters) -> Result<DetailedAnalysis> {
    let subset = filters::apply(df, filters)?;
    detailed_analysis(&subset)
}

/// Rounds half-to-even at `digits` fractional digits.
pub fn round_to(value: f64, digits: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(digits);
    let scaled = value * factor;
    let floor = scaled.floor();
    let rounded = if (scaled - floor - 0.5).abs() < f64::EPSILON * scaled.abs().max(1.0) {
        // Exact half: round to the even neighbor.
        if (floor as i64) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };
    rounded / factor
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1); 0.0 with fewer than two values.
fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

fn pooled_std(a: &[f64], b: &[f64]) -> f64 {
    let sa = sample_std(a);
    let sb = sample_std(b);
    ((sa * sa + sb * sb) / 2.0).sqrt()
}

/// Pearson correlation coefficient; 0.0 when either column is constant or
/// fewer than two pairs exist.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    let mx = mean(xs);
    let my = mean(ys);
    let numerator: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| (x - mx) * (y - my))
        .sum();
    let var_x: f64 = xs.iter().map(|x| (x - mx) * (x - mx)).sum();
    let var_y: f64 = ys.iter().map(|y| (y - my) * (y - my)).sum();
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    numerator / (var_x.sqrt() * var_y.sqrt())
}

/// Linear-interpolation quantile over sorted values; 0.0 on empty input.
fn quantile_linear(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

fn histogram(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len() - 1;
    let mut counts = vec![0usize; bins];
    let last = bins - 1;
    for &v in values {
        for b in 0..bins {
            let in_bin = if b == last {
                v >= edges[b] && v <= edges[b + 1]
            } else {
                v >= edges[b] && v < edges[b + 1]
            };
            if in_bin {
                counts[b] += 1;
                break;
            }
        }
    }
    counts
}

fn stroke_counts(df: &DataFrame) -> Result<(usize, usize)> {
    let stroke = df.column("stroke")?.as_materialized_series().i64()?;
    let mut cases = 0usize;
    let mut non_cases = 0usize;
    for v in stroke.iter().flatten() {
        if v == 1 {
            cases += 1;
        } else if v == 0 {
            non_cases += 1;
        }
    }
    Ok((cases, non_cases))
}

/// Column values as Option<f64> in row order, accepting Int64 and Float64.
fn opt_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)?;
    let series = column.as_materialized_series();
    let values = if let Ok(f64_values) = series.f64() {
        f64_values.iter().collect()
    } else {
        series
            .i64()?
            .iter()
            .map(|v| v.map(|x| x as f64))
            .collect()
    };
    Ok(values)
}

/// Aligned non-null pairs of two numeric columns.
fn column_pair(df: &DataFrame, a: &str, b: &str) -> Result<(Vec<f64>, Vec<f64>)> {
    let left = opt_f64(df, a)?;
    let right = opt_f64(df, b)?;
    let mut xs = Vec::with_capacity(left.len());
    let mut ys = Vec::with_capacity(right.len());
    for (x, y) in left.into_iter().zip(right) {
        if let (Some(x), Some(y)) = (x, y) {
            xs.push(x);
            ys.push(y);
        }
    }
    Ok((xs, ys))
}

/// Values of `name` split into (stroke == 1, stroke == 0) groups.
fn split_by_stroke(df: &DataFrame, name: &str) -> Result<(Vec<f64>, Vec<f64>)> {
    let (values, labels) = column_pair(df, name, "stroke")?;
    Ok(partition_by_label(&values, &labels))
}

fn partition_by_label(values: &[f64], labels: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut positive = Vec::new();
    let mut negative = Vec::new();
    for (&v, &label) in values.iter().zip(labels) {
        if label == 1.0 {
            positive.push(v);
        } else {
            negative.push(v);
        }
    }
    (positive, negative)
}

/// Mean of `values` restricted to rows where `keys` equals `key`.
fn mean_where(values: &[f64], keys: &[f64], key: f64) -> f64 {
    let selected: Vec<f64> = values
        .iter()
        .zip(keys)
        .filter(|(_, &k)| k == key)
        .map(|(&v, _)| v)
        .collect();
    mean(&selected)
}

fn importance_item(feature: &str, correlation: f64, effect_size: f64) -> FeatureImportance {
    let correlation = if correlation.is_finite() { correlation } else { 0.0 };
    let effect_size = if effect_size.is_finite() { effect_size } else { 0.0 };
    let score = (correlation.abs() * 80.0 + effect_size.abs() * 20.0).clamp(0.0, 100.0);
    FeatureImportance {
        feature_name: feature.to_string(),
        correlation: round_to(correlation, 3),
        effect_size: round_to(effect_size, 3),
        importance_score: round_to(score, 1),
    }
}

fn numerical_summary(df: &DataFrame, name: &str) -> Result<NumericalSummary> {
    let mut values = non_null_f64(df, name)?;
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let (min, max) = match (values.first(), values.last()) {
        (Some(&min), Some(&max)) => (min, max),
        _ => (0.0, 0.0),
    };
    let (stroke_values, no_stroke_values) = split_by_stroke(df, name)?;
    Ok(NumericalSummary {
        count: values.len(),
        mean: mean(&values),
        std: sample_std(&values),
        min,
        q25: quantile_linear(&values, 0.25),
        median: quantile_linear(&values, 0.5),
        q75: quantile_linear(&values, 0.75),
        max,
        stroke_mean: round_to(mean(&stroke_values), 1),
        no_stroke_mean: round_to(mean(&no_stroke_values), 1),
    })
}

fn breakdown_str(
    df: &DataFrame,
    name: &str,
    labels: &[(&str, &str)],
) -> Result<Vec<CategoryBreakdown>> {
    let column = df.column(name)?;
    let values = column.as_materialized_series().str()?;
    let stroke = df.column("stroke")?.as_materialized_series().i64()?;

    let mut groups: std::collections::BTreeMap<String, (usize, usize)> =
        std::collections::BTreeMap::new();
    for (value, label) in values.iter().zip(stroke.iter()) {
        if let Some(value) = value {
            let entry = groups.entry(value.to_string()).or_default();
            entry.0 += 1;
            if label == Some(1) {
                entry.1 += 1;
            }
        }
    }

    Ok(groups
        .into_iter()
        .map(|(value, (total, stroke_count))| CategoryBreakdown {
            label: labels
                .iter()
                .find(|(raw, _)| *raw == value)
                .map(|(_, display)| display.to_string())
                .unwrap_or_else(|| value.clone()),
            stroke_rate: stroke_count as f64 / total as f64,
            value,
            total,
            stroke_count,
        })
        .collect())
}

fn breakdown_int(
    df: &DataFrame,
    name: &str,
    labels: &[(i64, &str)],
) -> Result<Vec<CategoryBreakdown>> {
    let column = df.column(name)?;
    let values = column.as_materialized_series().i64()?;
    let stroke = df.column("stroke")?.as_materialized_series().i64()?;

    let mut groups: std::collections::BTreeMap<i64, (usize, usize)> =
        std::collections::BTreeMap::new();
    for (value, label) in values.iter().zip(stroke.iter()) {
        if let Some(value) = value {
            let entry = groups.entry(value).or_default();
            entry.0 += 1;
            if label == Some(1) {
                entry.1 += 1;
            }
        }
    }

    Ok(groups
        .into_iter()
        .map(|(value, (total, stroke_count))| CategoryBreakdown {
            label: labels
                .iter()
                .find(|(raw, _)| *raw == value)
                .map(|(_, display)| display.to_string())
                .unwrap_or_else(|| value.to_string()),
            stroke_rate: stroke_count as f64 / total as f64,
            value: value.to_string(),
            total,
            stroke_count,
        })
        .collect())
}

/// Non-null (value, stroke) pairs for one numeric column.
fn value_stroke_pairs(df: &DataFrame, name: &str) -> Result<Vec<(f64, i64)>> {
    let values = opt_f64(df, name)?;
    let stroke = df.column("stroke")?.as_materialized_series().i64()?;
    let mut pairs = Vec::with_capacity(values.len());
    for (value, label) in values.into_iter().zip(stroke.iter()) {
        if let (Some(value), Some(label)) = (value, label) {
            pairs.push((value, label));
        }
    }
    Ok(pairs)
}

struct BandSummary {
    total: usize,
    stroke_count: usize,
    stroke_rate: f64,
    mean: f64,
}

/// Summary of the rows whose value falls in [lo, hi). An empty band reports
/// zero counts and the midpoint as the mean.
fn band_summary(pairs: &[(f64, i64)], lo: f64, hi: f64) -> BandSummary {
    let mut total = 0usize;
    let mut stroke_count = 0usize;
    let mut sum = 0.0;
    for &(value, label) in pairs {
        if value >= lo && value < hi {
            total += 1;
            sum += value;
            if label == 1 {
                stroke_count += 1;
            }
        }
    }
    if total == 0 {
        return BandSummary {
            total: 0,
            stroke_count: 0,
            stroke_rate: 0.0,
            mean: round_to((lo + hi) / 2.0, 1),
        };
    }
    BandSummary {
        total,
        stroke_count,
        stroke_rate: round_to(stroke_count as f64 / total as f64 * 100.0, 2),
        mean: round_to(sum / total as f64, 1),
    }
}

fn numeric_comparison(df: &DataFrame, name: &str) -> Result<NumericComparison> {
    let (stroke_values, no_stroke_values) = split_by_stroke(df, name)?;
    let stroke_mean = mean(&stroke_values);
    let no_stroke_mean = mean(&no_stroke_values);
    let pct_difference = if no_stroke_mean > 0.0 {
        round_to((stroke_mean - no_stroke_mean) / no_stroke_mean * 100.0, 1)
    } else {
        0.0
    };
    Ok(NumericComparison {
        stroke_mean: round_to(stroke_mean, 2),
        no_stroke_mean: round_to(no_stroke_mean, 2),
        difference: round_to(stroke_mean - no_stroke_mean, 2),
        pct_difference,
    })
}

fn binary_comparison(df: &DataFrame, name: &str) -> Result<BinaryComparison> {
    let (xs, ys) = column_pair(df, name, "stroke")?;
    let rate_with = mean_where(&ys, &xs, 1.0);
    let rate_without = mean_where(&ys, &xs, 0.0);
    let risk_ratio = if rate_without > 0.0 {
        round_to(rate_with / rate_without, 2)
    } else {
        0.0
    };
    Ok(BinaryComparison {
        stroke_rate_with: round_to(rate_with * 100.0, 2),
        stroke_rate_without: round_to(rate_without * 100.0, 2),
        risk_ratio,
        risk_difference: round_to((rate_with - rate_without) * 100.0, 2),
    })
}
