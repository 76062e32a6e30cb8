//! Loading tables from files and record batches, then analyzing them.

use std::fs;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use relnorm::config::{DetectorConfig, EngineConfig};
use relnorm::engine::NormalizationEngine;
use relnorm::error::RelnormError;
use relnorm::model::NormalForm;
use relnorm::sources::{BatchSource, CsvOptions, CsvSource, ProfileSource};
use tempfile::TempDir;

fn engine() -> NormalizationEngine {
    NormalizationEngine::new(EngineConfig::default().with_detector(DetectorConfig::sequential()))
        .unwrap()
}

const ORDER_LINES: &str = "order_id,product_id,customer_name
1,P1,Alice
1,P2,Alice
2,P1,Bob
2,P3,Bob
3,P2,Alice
3,P3,Alice
";

#[tokio::test]
async fn test_csv_file_analysis() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("order_line.csv");
    fs::write(&path, ORDER_LINES).unwrap();

    let source = CsvSource::new(path.to_str().unwrap()).unwrap();
    assert_eq!(source.table_name(), "OrderLine");

    let result = engine().analyze_source(&source).await.unwrap();
    assert_eq!(result.original_table, "OrderLine");
    assert_eq!(result.original_nf, NormalForm::First);
    assert!(result.table("Order").is_some());
}

#[tokio::test]
async fn test_tsv_with_repeating_group() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("students.tsv");
    fs::write(
        &path,
        "student_id\tstudent_name\tcourse1\tcourse2\n1\tAnn\tMath\tPhysics\n2\tBen\tMath\tChemistry\n3\tCal\tBiology\t\n",
    )
    .unwrap();

    let options = CsvOptions {
        delimiter: b'\t',
        table_name: Some("Student".to_string()),
        ..Default::default()
    };
    let source = CsvSource::with_options(path.to_str().unwrap(), options).unwrap();
    let profile = source.load().await.unwrap();
    assert_eq!(profile.column_count(), 4);
    assert_eq!(profile.rows()[2][3], None);

    let result = engine().analyze(&profile).unwrap();
    assert_eq!(result.original_nf, NormalForm::Unnormalized);
    assert_eq!(result.table("StudentCourse").unwrap().row_count, 5);
}

#[tokio::test]
async fn test_missing_csv_is_a_source_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.csv");
    let source = CsvSource::new(path.to_str().unwrap()).unwrap();
    let err = engine().analyze_source(&source).await.unwrap_err();
    assert!(matches!(err, RelnormError::DataSource { .. }));
}

#[tokio::test]
async fn test_record_batches() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("emp_id", DataType::Int64, false),
        Field::new("dept_id", DataType::Utf8, true),
        Field::new("dept_name", DataType::Utf8, true),
    ]));
    let first = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef,
            Arc::new(StringArray::from(vec!["D1", "D1", "D2"])),
            Arc::new(StringArray::from(vec!["Sales", "Sales", "Ops"])),
        ],
    )
    .unwrap();
    let second = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![4, 5])) as ArrayRef,
            Arc::new(StringArray::from(vec!["D2", "D3"])),
            Arc::new(StringArray::from(vec![Some("Ops"), None])),
        ],
    )
    .unwrap();

    let source = BatchSource::new("Employee", schema, vec![first, second]);
    let profile = source.load().await.unwrap();
    assert_eq!(profile.row_count(), 5);
    assert_eq!(profile.rows()[0][0].as_deref(), Some("1"));
    assert_eq!(profile.rows()[4][2], None);

    let result = engine().analyze_source(&source).await.unwrap();
    assert_eq!(result.original_table, "Employee");
    assert_eq!(result.dependencies.primary_key, vec!["emp_id"]);
}
