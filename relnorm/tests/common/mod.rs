//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use relnorm::config::{DetectorConfig, EngineConfig, PlannerConfig};
use relnorm::engine::NormalizationEngine;
use relnorm::model::{AnalysisResult, NormalForm, TableProfile, TableSchema};

pub fn table(name: &str, columns: &[&str], rows: &[&[&str]]) -> TableProfile {
    let mut builder = TableProfile::builder(name).columns(columns.iter().copied());
    for row in rows {
        builder = builder.row(row.iter().copied());
    }
    builder.build().unwrap()
}

pub fn engine() -> NormalizationEngine {
    engine_with(PlannerConfig::default())
}

pub fn engine_with(planner: PlannerConfig) -> NormalizationEngine {
    NormalizationEngine::new(
        EngineConfig::default()
            .with_detector(DetectorConfig::sequential())
            .with_planner(planner),
    )
    .unwrap()
}

pub fn engine_with_detector(detector: DetectorConfig) -> NormalizationEngine {
    NormalizationEngine::new(EngineConfig::default().with_detector(detector)).unwrap()
}

pub fn analyze(profile: &TableProfile) -> AnalysisResult {
    engine().analyze(profile).unwrap()
}

pub fn analyze_to(profile: &TableProfile, target: NormalForm) -> AnalysisResult {
    engine_with(PlannerConfig::default().with_target(target))
        .analyze(profile)
        .unwrap()
}

/// Looks a result table up by name, panicking with the names present.
pub fn find<'a>(result: &'a AnalysisResult, name: &str) -> &'a TableSchema {
    result.table(name).unwrap_or_else(|| {
        let names: Vec<&str> = result.tables.iter().map(|t| t.name.as_str()).collect();
        panic!("no table {name} in {names:?}")
    })
}

/// Scenario A: a repeating course group.
pub fn student_courses() -> TableProfile {
    table(
        "Student",
        &["student_id", "student_name", "course1", "course2"],
        &[
            &["1", "Ann", "Math", "Physics"],
            &["2", "Ben", "Math", "Chemistry"],
            &["3", "Cal", "Biology", ""],
        ],
    )
}

/// Scenario B: `order_id -> customer_name` under the key `(order_id, product_id)`.
pub fn order_lines() -> TableProfile {
    table(
        "OrderLine",
        &["order_id", "product_id", "customer_name"],
        &[
            &["1", "P1", "Alice"],
            &["1", "P2", "Alice"],
            &["2", "P1", "Bob"],
            &["2", "P3", "Bob"],
            &["3", "P2", "Alice"],
            &["3", "P3", "Alice"],
        ],
    )
}

/// Scenario C: already in 3NF with a single-column key.
pub fn products() -> TableProfile {
    table(
        "Product",
        &["product_id", "name", "price"],
        &[
            &["1", "Pen", "1.5"],
            &["2", "Pen", "1.5"],
            &["3", "Pen", "2.0"],
            &["4", "Ink", "1.5"],
            &["5", "Ink", "1.5"],
        ],
    )
}

/// `dept_id -> dept_name` with `emp_id` as key.
pub fn employees() -> TableProfile {
    table(
        "Employee",
        &["emp_id", "emp_name", "dept_id", "dept_name"],
        &[
            &["1", "Ann", "D1", "Sales"],
            &["2", "Ben", "D1", "Sales"],
            &["3", "Cal", "D2", "Ops"],
            &["4", "Dee", "D2", "Ops"],
            &["5", "Eve", "D3", "Sales"],
        ],
    )
}

/// Two transitive chains: `dept_id -> dept_name` and `city -> state`.
pub fn employee_locations() -> TableProfile {
    table(
        "Employee",
        &["emp_id", "dept_id", "dept_name", "city", "state"],
        &[
            &["1", "D1", "Sales", "Paris", "FR"],
            &["2", "D1", "Sales", "Lyon", "FR"],
            &["3", "D2", "Ops", "Paris", "FR"],
            &["4", "D2", "Ops", "Rome", "IT"],
            &["5", "D3", "Sales", "Rome", "IT"],
        ],
    )
}

/// `instructor -> course` where `course` is prime.
pub fn enrollments() -> TableProfile {
    table(
        "Enrollment",
        &["student", "course", "instructor"],
        &[
            &["s1", "Math", "Smith"],
            &["s1", "Physics", "Jones"],
            &["s2", "Math", "Brown"],
            &["s2", "Physics", "Jones"],
            &["s3", "Math", "Smith"],
        ],
    )
}

/// Teachers and books of a course vary independently.
pub fn course_offerings() -> TableProfile {
    let mut builder =
        TableProfile::builder("CourseOffering").columns(["course", "teacher", "book"]);
    for (course, teachers, books) in [
        ("Math", ["Smith", "Jones"], ["Algebra", "Calculus"]),
        ("Physics", ["Smith", "Brown"], ["Mechanics", "Optics"]),
        ("Chemistry", ["Jones", "Brown"], ["Algebra", "Optics"]),
    ] {
        for teacher in teachers {
            for book in books {
                builder = builder.row([course, teacher, book]);
            }
        }
    }
    builder.build().unwrap()
}

/// A cyclic constraint: the table is the join of its three pair projections.
pub fn supply() -> TableProfile {
    table(
        "Supply",
        &["supplier", "part", "project"],
        &[
            &["s1", "p1", "j2"],
            &["s1", "p2", "j1"],
            &["s2", "p1", "j1"],
            &["s1", "p1", "j1"],
        ],
    )
}

/// Nine independent numbered groups `a1, a2` through `i1, i2` keyed by `id`.
pub fn wide_groups() -> TableProfile {
    let bases = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];
    let mut columns = vec!["id".to_string()];
    for base in bases {
        columns.push(format!("{base}1"));
        columns.push(format!("{base}2"));
    }
    let mut builder = TableProfile::builder("Wide").columns(columns);
    for row in 0..3 {
        let mut cells = vec![format!("w{row}")];
        for base in bases {
            cells.push(format!("{base}{row}x"));
            cells.push(format!("{base}{row}y"));
        }
        builder = builder.row(cells);
    }
    builder.build().unwrap()
}
