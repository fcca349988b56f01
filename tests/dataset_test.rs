use color_eyre::Result;
use polars::prelude::*;
use strokedash::dataset;

const HEADER: &str = "id,gender,age,hypertension,heart_disease,ever_married,work_type,Residence_type,avg_glucose_level,bmi,smoking_status,stroke";

fn write_csv(rows: &[&str]) -> Result<(tempfile::TempDir, std::path::PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("stroke.csv");
    let mut contents = String::from(HEADER);
    for row in rows {
        contents.push('\n');
        contents.push_str(row);
    }
    std::fs::write(&path, contents)?;
    Ok((dir, path))
}

fn sample_rows() -> Vec<&'static str> {
    vec![
        "1,Male,67,0,1,Yes,Private,Urban,228.69,36.6,formerly smoked,1",
        "2,Female,61,0,0,Yes,Self-employed,Rural,202.21,N/A,never smoked,1",
        "3,Male,80,0,1,Yes,Private,Rural,105.92,32.5,never smoked,1",
        "4,Female,49,0,0,Yes,Private,Urban,171.23,34.4,smokes,0",
        "5,Female,79,1,0,Yes,Self-employed,Rural,174.12,24.0,N/A,0",
    ]
}

#[test]
fn load_cleans_and_casts() -> Result<()> {
    let (_dir, path) = write_csv(&sample_rows())?;
    let df = dataset::load(&path)?;
    assert_eq!(df.height(), 5);

    // Integer-looking ages become floats after cleaning.
    assert_eq!(df.column("age")?.dtype(), &DataType::Float64);
    assert_eq!(df.column("stroke")?.dtype(), &DataType::Int64);

    let ages: Vec<f64> = df
        .column("age")?
        .as_materialized_series()
        .f64()?
        .iter()
        .flatten()
        .collect();
    assert_eq!(ages, vec![67.0, 61.0, 80.0, 49.0, 79.0]);
    Ok(())
}

#[test]
fn missing_bmi_takes_column_median() -> Result<()> {
    let (_dir, path) = write_csv(&sample_rows())?;
    let df = dataset::load(&path)?;
    let bmi: Vec<f64> = df
        .column("bmi")?
        .as_materialized_series()
        .f64()?
        .iter()
        .flatten()
        .collect();
    // Median of 24.0, 32.5, 34.4, 36.6 interpolates to 33.45.
    assert_eq!(bmi.len(), 5);
    assert!((bmi[1] - 33.45).abs() < 1e-9);
    assert!((bmi[0] - 36.6).abs() < 1e-9);
    Ok(())
}

#[test]
fn missing_smoking_status_becomes_unknown() -> Result<()> {
    let (_dir, path) = write_csv(&sample_rows())?;
    let df = dataset::load(&path)?;
    let status: Vec<&str> = df
        .column("smoking_status")?
        .as_materialized_series()
        .str()?
        .iter()
        .flatten()
        .collect();
    assert_eq!(status[4], "Unknown");
    assert_eq!(status[0], "formerly smoked");
    Ok(())
}

#[test]
fn missing_required_column_is_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.csv");
    std::fs::write(&path, "id,gender,age\n1,Male,67\n")?;
    let err = dataset::load(&path).unwrap_err();
    assert!(err.to_string().contains("required column"));
    Ok(())
}

#[test]
fn records_export_keeps_source_field_names() -> Result<()> {
    let (_dir, path) = write_csv(&sample_rows())?;
    let df = dataset::load(&path)?;
    let rows = dataset::records(&df)?;
    assert_eq!(rows.len(), 5);

    let first = &rows[0];
    assert_eq!(first.len(), 12);
    assert!(first.contains_key("Residence_type"));
    assert_eq!(first["id"], serde_json::json!(1));
    assert_eq!(first["gender"], serde_json::json!("Male"));
    assert_eq!(first["stroke"], serde_json::json!(1));

    // The imputed row serializes the median, not null.
    let imputed = rows[1]["bmi"].as_f64().unwrap();
    assert!((imputed - 33.45).abs() < 1e-9);
    Ok(())
}
