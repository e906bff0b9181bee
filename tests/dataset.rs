mod common;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parquet::data_type::{BoolType, ByteArray, ByteArrayType, DataType, DoubleType, Int64Type};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::{SerializedColumnWriter, SerializedFileWriter};
use parquet::schema::parser::parse_message_type;
use rusqlite::{Connection, params};

use common::{fixture_deliveries, fixture_matches, fixture_tables};
use ipl_stats::dataset::{self, TableSource};

fn seeded_conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    dataset::init_schema(&conn).unwrap();
    let written = dataset::write_tables(&mut conn, &fixture_tables()).unwrap();
    assert_eq!(written, (6, 22));
    conn
}

#[test]
fn sqlite_tables_load_in_source_order() {
    let conn = seeded_conn();
    let loaded = dataset::load_tables(&conn).unwrap();
    let fixture = fixture_tables();

    assert_eq!(loaded.matches(), fixture.matches());
    assert_eq!(loaded.deliveries(), fixture.deliveries());
    // match 2 was written first and must stay first
    assert_eq!(loaded.deliveries()[0].match_id, 2);
}

#[test]
fn na_text_is_read_as_missing() {
    let conn = seeded_conn();
    conn.execute("UPDATE matches SET city = 'NA' WHERE match_id = 1", [])
        .unwrap();
    let loaded = dataset::load_tables(&conn).unwrap();
    let first = loaded.matches().iter().find(|m| m.match_id == 1).unwrap();
    assert_eq!(first.city, None);
}

#[test]
fn unknown_toss_decision_fails_the_load() {
    let conn = seeded_conn();
    conn.execute(
        "UPDATE matches SET toss_decision = ?1 WHERE match_id = 3",
        params!["bowl"],
    )
    .unwrap();
    let err = dataset::load_tables(&conn).unwrap_err();
    assert!(format!("{err:#}").contains("match 3"), "{err:#}");
}

#[test]
fn inconsistent_run_totals_fail_the_load() {
    let conn = seeded_conn();
    conn.execute(
        "UPDATE deliveries SET total_runs = 9 WHERE rowid = 1",
        [],
    )
    .unwrap();
    let err = dataset::load_tables(&conn).unwrap_err();
    assert!(format!("{err:#}").contains("total_runs"), "{err:#}");
}

#[test]
fn negative_over_fails_the_load() {
    let conn = seeded_conn();
    conn.execute(r#"UPDATE deliveries SET "over" = -1 WHERE rowid = 2"#, [])
        .unwrap();
    let err = dataset::load_tables(&conn).unwrap_err();
    assert!(format!("{err:#}").contains("over"), "{err:#}");
}

#[test]
fn missing_tables_fail_the_load() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(dataset::load_tables(&conn).is_err());
}

#[test]
fn sqlite_file_round_trip_through_source() {
    let path: PathBuf = std::env::temp_dir().join(format!(
        "ipl_stats_dataset_{}.sqlite",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut conn = dataset::open_db(&path).unwrap();
        dataset::write_tables(&mut conn, &fixture_tables()).unwrap();
    }

    let source = TableSource::Sqlite(path.clone());
    assert!(source.describe().starts_with("sqlite:"));
    let loaded = dataset::load(&source).unwrap();
    assert_eq!(loaded.matches().len(), 6);
    assert_eq!(loaded.deliveries().len(), 22);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn missing_database_file_is_an_error() {
    let source = TableSource::Sqlite(PathBuf::from("definitely/not/here.sqlite"));
    let err = dataset::load(&source).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn missing_parquet_file_is_an_error() {
    let source = TableSource::Parquet {
        matches: PathBuf::from("definitely/not/matches.parquet"),
        deliveries: PathBuf::from("definitely/not/deliveries.parquet"),
    };
    assert!(dataset::load(&source).is_err());
}

enum Column {
    Long(Vec<Option<i64>>),
    Double(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Flag(Vec<bool>),
}

impl Column {
    fn schema_type(&self) -> &'static str {
        match self {
            Column::Long(_) => "INT64",
            Column::Double(_) => "DOUBLE",
            Column::Text(_) => "BYTE_ARRAY",
            Column::Flag(_) => "BOOLEAN",
        }
    }
}

fn write_optional<T: DataType>(column: &mut SerializedColumnWriter<'_>, values: Vec<Option<T::T>>) {
    let def_levels: Vec<i16> = values.iter().map(|v| i16::from(v.is_some())).collect();
    let present: Vec<T::T> = values.into_iter().flatten().collect();
    column
        .typed::<T>()
        .write_batch(&present, Some(&def_levels), None)
        .unwrap();
}

/// Writes one row group with every column OPTIONAL, in the given order.
fn write_parquet(path: &Path, columns: Vec<(&str, Column)>) {
    let fields: String = columns
        .iter()
        .map(|(name, column)| {
            let annotation = if matches!(column, Column::Text(_)) { " (UTF8)" } else { "" };
            format!("  OPTIONAL {} {name}{annotation};\n", column.schema_type())
        })
        .collect();
    let schema = parse_message_type(&format!("message table {{\n{fields}}}")).unwrap();
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(path).unwrap();
    let mut writer = SerializedFileWriter::new(file, Arc::new(schema), props).unwrap();

    let mut row_group = writer.next_row_group().unwrap();
    let mut columns = columns.into_iter();
    while let Some(mut column_writer) = row_group.next_column().unwrap() {
        let (_, column) = columns.next().expect("one column per schema field");
        match column {
            Column::Long(values) => write_optional::<Int64Type>(&mut column_writer, values),
            Column::Double(values) => write_optional::<DoubleType>(&mut column_writer, values),
            Column::Text(values) => write_optional::<ByteArrayType>(
                &mut column_writer,
                values
                    .into_iter()
                    .map(|v| v.map(|s| ByteArray::from(s.as_str())))
                    .collect(),
            ),
            Column::Flag(values) => write_optional::<BoolType>(
                &mut column_writer,
                values.into_iter().map(Some).collect(),
            ),
        }
        column_writer.close().unwrap();
    }
    row_group.close().unwrap();
    writer.close().unwrap();
}

fn text<T>(rows: &[T], f: impl Fn(&T) -> Option<String>) -> Column {
    Column::Text(rows.iter().map(f).collect())
}

fn long<T>(rows: &[T], f: impl Fn(&T) -> i64) -> Column {
    Column::Long(rows.iter().map(|r| Some(f(r))).collect())
}

/// Missing margins are written as NaN and missing cities as nulls, the way pandas exports them.
fn match_columns(integer_seasons: bool) -> Vec<(&'static str, Column)> {
    let rows = fixture_matches();
    let season = if integer_seasons {
        long(&rows, |m| m.season.parse().unwrap())
    } else {
        text(&rows, |m| Some(m.season.clone()))
    };
    vec![
        ("match_id", long(&rows, |m| m.match_id)),
        ("season", season),
        ("city", text(&rows, |m| m.city.clone())),
        ("venue", text(&rows, |m| Some(m.venue.clone()))),
        ("team1", text(&rows, |m| Some(m.team1.clone()))),
        ("team2", text(&rows, |m| Some(m.team2.clone()))),
        ("toss_winner", text(&rows, |m| Some(m.toss_winner.clone()))),
        ("toss_decision", text(&rows, |m| Some(m.toss_decision.as_str().to_string()))),
        ("winner", text(&rows, |m| m.winner.clone())),
        ("result", text(&rows, |m| Some(m.result.as_str().to_string()))),
        (
            "result_margin",
            Column::Double(
                rows.iter()
                    .map(|m| Some(m.result_margin.unwrap_or(f64::NAN)))
                    .collect(),
            ),
        ),
        ("target_runs", Column::Double(rows.iter().map(|m| m.target_runs).collect())),
    ]
}

/// Missing dismissal kinds are written as "NA", missing dismissed players as nulls.
fn delivery_columns(numeric_flags: bool) -> Vec<(&'static str, Column)> {
    let rows = fixture_deliveries();
    let is_wicket = if numeric_flags {
        long(&rows, |d| i64::from(d.is_wicket))
    } else {
        Column::Flag(rows.iter().map(|d| d.is_wicket).collect())
    };
    vec![
        ("match_id", long(&rows, |d| d.match_id)),
        ("inning", long(&rows, |d| i64::from(d.inning))),
        ("batting_team", text(&rows, |d| Some(d.batting_team.clone()))),
        ("bowling_team", text(&rows, |d| Some(d.bowling_team.clone()))),
        ("over", long(&rows, |d| i64::from(d.over))),
        ("ball", long(&rows, |d| i64::from(d.ball))),
        ("batter", text(&rows, |d| Some(d.batter.clone()))),
        ("bowler", text(&rows, |d| Some(d.bowler.clone()))),
        ("non_striker", text(&rows, |d| Some(d.non_striker.clone()))),
        ("batsman_runs", long(&rows, |d| i64::from(d.batsman_runs))),
        ("extra_runs", long(&rows, |d| i64::from(d.extra_runs))),
        ("total_runs", long(&rows, |d| i64::from(d.total_runs))),
        ("is_wicket", is_wicket),
        ("player_dismissed", text(&rows, |d| d.player_dismissed.clone())),
        (
            "dismissal_kind",
            text(&rows, |d| Some(d.dismissal_kind.clone().unwrap_or_else(|| "NA".to_string()))),
        ),
    ]
}

fn parquet_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ipl_stats_parquet_{}_{tag}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn parquet_source(dir: &Path) -> TableSource {
    TableSource::Parquet {
        matches: dir.join("matches.parquet"),
        deliveries: dir.join("deliveries.parquet"),
    }
}

#[test]
fn parquet_tables_load_like_the_fixture() {
    let dir = parquet_dir("typed");
    write_parquet(&dir.join("matches.parquet"), match_columns(false));
    write_parquet(&dir.join("deliveries.parquet"), delivery_columns(false));

    let loaded = dataset::load(&parquet_source(&dir)).unwrap();
    let fixture = fixture_tables();
    assert_eq!(loaded.matches(), fixture.matches());
    assert_eq!(loaded.deliveries(), fixture.deliveries());

    let no_result = loaded.matches().iter().find(|m| m.match_id == 4).unwrap();
    assert_eq!(no_result.city, None);
    assert_eq!(no_result.result_margin, None);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn parquet_accepts_integer_seasons_and_numeric_flags() {
    let dir = parquet_dir("numeric");
    write_parquet(&dir.join("matches.parquet"), match_columns(true));
    write_parquet(&dir.join("deliveries.parquet"), delivery_columns(true));

    let loaded = dataset::load(&parquet_source(&dir)).unwrap();
    assert_eq!(loaded.matches()[0].season, "2008");
    assert_eq!(loaded.deliveries(), fixture_tables().deliveries());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn parquet_missing_column_fails_the_load() {
    let dir = parquet_dir("missing_column");
    write_parquet(&dir.join("matches.parquet"), match_columns(false));
    let mut deliveries = delivery_columns(false);
    deliveries.retain(|(name, _)| *name != "dismissal_kind");
    write_parquet(&dir.join("deliveries.parquet"), deliveries);

    let err = dataset::load(&parquet_source(&dir)).unwrap_err();
    assert!(format!("{err:#}").contains("missing column dismissal_kind"), "{err:#}");

    std::fs::remove_dir_all(&dir).unwrap();
}
