use color_eyre::Result;
use polars::prelude::*;

/// Builds a small in-memory stroke table with the full production schema.
///
/// Eight patients, three stroke cases. Values are chosen so that the
/// glucose and bmi band boundaries and both smoking groups are covered.
pub fn stroke_table() -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new("id".into(), vec![0i64, 1, 2, 3, 4, 5, 6, 7]).into(),
        Series::new(
            "gender".into(),
            vec![
                "Male", "Female", "Female", "Male", "Female", "Male", "Female", "Other",
            ],
        )
        .into(),
        Series::new(
            "age".into(),
            vec![67.0f64, 45.0, 80.0, 23.0, 56.0, 34.0, 71.0, 19.0],
        )
        .into(),
        Series::new("hypertension".into(), vec![1i64, 0, 1, 0, 0, 0, 1, 0]).into(),
        Series::new("heart_disease".into(), vec![1i64, 0, 0, 0, 1, 0, 0, 0]).into(),
        Series::new(
            "ever_married".into(),
            vec!["Yes", "Yes", "Yes", "No", "Yes", "No", "Yes", "No"],
        )
        .into(),
        Series::new(
            "work_type".into(),
            vec![
                "Private",
                "Self-employed",
                "Private",
                "children",
                "Govt_job",
                "Private",
                "Self-employed",
                "Never_worked",
            ],
        )
        .into(),
        Series::new(
            "Residence_type".into(),
            vec![
                "Urban", "Rural", "Rural", "Urban", "Urban", "Rural", "Urban", "Rural",
            ],
        )
        .into(),
        Series::new(
            "avg_glucose_level".into(),
            vec![228.69f64, 95.0, 105.92, 82.0, 186.21, 70.0, 125.0, 65.0],
        )
        .into(),
        Series::new(
            "bmi".into(),
            vec![36.6f64, 28.1, 32.5, 17.0, 29.0, 22.8, 27.4, 24.9],
        )
        .into(),
        Series::new(
            "smoking_status".into(),
            vec![
                "formerly smoked",
                "never smoked",
                "never smoked",
                "Unknown",
                "smokes",
                "never smoked",
                "formerly smoked",
                "Unknown",
            ],
        )
        .into(),
        Series::new("stroke".into(), vec![1i64, 0, 1, 0, 1, 0, 0, 0]).into(),
    ])?;
    Ok(df)
}

/// Minimal table with the full schema and the given stroke labels. Ages
/// count up from 20 in steps of 10, glucose from 80 in steps of 5, bmi
/// from 20 in steps of 1.
pub fn labeled_table(stroke: &[i64]) -> Result<DataFrame> {
    let n = stroke.len();
    let ages: Vec<f64> = (0..n).map(|i| 20.0 + 10.0 * i as f64).collect();
    let glucose: Vec<f64> = (0..n).map(|i| 80.0 + 5.0 * i as f64).collect();
    let bmi: Vec<f64> = (0..n).map(|i| 20.0 + i as f64).collect();
    let df = DataFrame::new(vec![
        Series::new("id".into(), (0..n as i64).collect::<Vec<i64>>()).into(),
        Series::new("gender".into(), vec!["Female"; n]).into(),
        Series::new("age".into(), ages).into(),
        Series::new("hypertension".into(), vec![0i64; n]).into(),
        Series::new("heart_disease".into(), vec![0i64; n]).into(),
        Series::new("ever_married".into(), vec!["Yes"; n]).into(),
        Series::new("work_type".into(), vec!["Private"; n]).into(),
        Series::new("Residence_type".into(), vec!["Urban"; n]).into(),
        Series::new("avg_glucose_level".into(), glucose).into(),
        Series::new("bmi".into(), bmi).into(),
        Series::new("smoking_status".into(), vec!["never smoked"; n]).into(),
        Series::new("stroke".into(), stroke.to_vec()).into(),
    ])?;
    Ok(df)
}
