use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::{Field, Row};
use rusqlite::{Connection, OpenFlags, params};

use crate::tables::{DeliveryRow, MatchRow, Tables};

/// Where the two input tables live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    Sqlite(PathBuf),
    Parquet {
        matches: PathBuf,
        deliveries: PathBuf,
    },
}

impl TableSource {
    pub fn describe(&self) -> String {
        match self {
            TableSource::Sqlite(path) => format!("sqlite:{}", path.display()),
            TableSource::Parquet {
                matches,
                deliveries,
            } => format!(
                "parquet:{},{}",
                matches.display(),
                deliveries.display()
            ),
        }
    }
}

pub fn load(source: &TableSource) -> Result<Tables> {
    match source {
        TableSource::Sqlite(path) => load_sqlite(path),
        TableSource::Parquet {
            matches,
            deliveries,
        } => load_parquet(matches, deliveries),
    }
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            match_id INTEGER PRIMARY KEY,
            season TEXT NOT NULL,
            city TEXT NULL,
            venue TEXT NOT NULL,
            team1 TEXT NOT NULL,
            team2 TEXT NOT NULL,
            toss_winner TEXT NOT NULL,
            toss_decision TEXT NOT NULL,
            winner TEXT NULL,
            result TEXT NOT NULL,
            result_margin REAL NULL,
            target_runs REAL NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_season ON matches(season);

        CREATE TABLE IF NOT EXISTS deliveries (
            match_id INTEGER NOT NULL,
            inning INTEGER NOT NULL,
            batting_team TEXT NOT NULL,
            bowling_team TEXT NOT NULL,
            "over" INTEGER NOT NULL,
            ball INTEGER NOT NULL,
            batter TEXT NOT NULL,
            bowler TEXT NOT NULL,
            non_striker TEXT NOT NULL,
            batsman_runs INTEGER NOT NULL,
            extra_runs INTEGER NOT NULL,
            total_runs INTEGER NOT NULL,
            is_wicket INTEGER NOT NULL,
            player_dismissed TEXT NULL,
            dismissal_kind TEXT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_deliveries_match ON deliveries(match_id);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

pub fn load_sqlite(path: &Path) -> Result<Tables> {
    if !path.is_file() {
        bail!("table database {} does not exist", path.display());
    }
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("open sqlite db {}", path.display()))?;
    load_tables(&conn)
}

pub fn load_tables(conn: &Connection) -> Result<Tables> {
    let matches = load_matches(conn)?;
    let deliveries = load_deliveries(conn)?;
    Tables::new(matches, deliveries).context("validate sqlite tables")
}

fn load_matches(conn: &Connection) -> Result<Vec<MatchRow>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                match_id, season, city, venue, team1, team2,
                toss_winner, toss_decision, winner, result,
                result_margin, target_runs
            FROM matches
            ORDER BY rowid ASC
            "#,
        )
        .context("prepare load matches query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, Option<String>>(8)?,
                row.get::<_, String>(9)?,
                row.get::<_, Option<f64>>(10)?,
                row.get::<_, Option<f64>>(11)?,
            ))
        })
        .context("query load matches")?;

    let mut out = Vec::new();
    for row in rows {
        let (
            match_id,
            season,
            city,
            venue,
            team1,
            team2,
            toss_winner,
            toss_decision,
            winner,
            result,
            result_margin,
            target_runs,
        ) = row.context("decode match row")?;
        out.push(MatchRow {
            match_id,
            season,
            city: non_blank(city),
            venue,
            team1,
            team2,
            toss_winner,
            toss_decision: toss_decision
                .parse()
                .with_context(|| format!("match {match_id}"))?,
            winner: non_blank(winner),
            result: result.parse().with_context(|| format!("match {match_id}"))?,
            result_margin,
            target_runs,
        });
    }
    Ok(out)
}

fn load_deliveries(conn: &Connection) -> Result<Vec<DeliveryRow>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                match_id, inning, batting_team, bowling_team, "over", ball,
                batter, bowler, non_striker,
                batsman_runs, extra_runs, total_runs,
                is_wicket, player_dismissed, dismissal_kind
            FROM deliveries
            ORDER BY rowid ASC
            "#,
        )
        .context("prepare load deliveries query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(RawDelivery {
                match_id: row.get(0)?,
                inning: row.get(1)?,
                batting_team: row.get(2)?,
                bowling_team: row.get(3)?,
                over: row.get(4)?,
                ball: row.get(5)?,
                batter: row.get(6)?,
                bowler: row.get(7)?,
                non_striker: row.get(8)?,
                batsman_runs: row.get(9)?,
                extra_runs: row.get(10)?,
                total_runs: row.get(11)?,
                is_wicket: row.get::<_, i64>(12)? != 0,
                player_dismissed: row.get(13)?,
                dismissal_kind: row.get(14)?,
            })
        })
        .context("query load deliveries")?;

    let mut out = Vec::new();
    for (idx, row) in rows.enumerate() {
        let raw = row.context("decode delivery row")?;
        out.push(
            raw.into_row()
                .with_context(|| format!("delivery row #{idx}"))?,
        );
    }
    Ok(out)
}

pub fn insert_match(conn: &Connection, m: &MatchRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO matches (
            match_id, season, city, venue, team1, team2,
            toss_winner, toss_decision, winner, result,
            result_margin, target_runs
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
        params![
            m.match_id,
            m.season,
            m.city,
            m.venue,
            m.team1,
            m.team2,
            m.toss_winner,
            m.toss_decision.as_str(),
            m.winner,
            m.result.as_str(),
            m.result_margin,
            m.target_runs,
        ],
    )
    .with_context(|| format!("insert match {}", m.match_id))?;
    Ok(())
}

pub fn insert_delivery(conn: &Connection, d: &DeliveryRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO deliveries (
            match_id, inning, batting_team, bowling_team, "over", ball,
            batter, bowler, non_striker,
            batsman_runs, extra_runs, total_runs,
            is_wicket, player_dismissed, dismissal_kind
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
        params![
            d.match_id,
            d.inning,
            d.batting_team,
            d.bowling_team,
            d.over,
            d.ball,
            d.batter,
            d.bowler,
            d.non_striker,
            d.batsman_runs,
            d.extra_runs,
            d.total_runs,
            i64::from(d.is_wicket),
            d.player_dismissed,
            d.dismissal_kind,
        ],
    )
    .with_context(|| format!("insert delivery for match {}", d.match_id))?;
    Ok(())
}

/// Writes both tables into `conn` inside one transaction. Returns (matches, deliveries) written.
pub fn write_tables(conn: &mut Connection, tables: &Tables) -> Result<(usize, usize)> {
    let tx = conn.transaction().context("begin table import")?;
    for m in tables.matches() {
        insert_match(&tx, m)?;
    }
    for d in tables.deliveries() {
        insert_delivery(&tx, d)?;
    }
    tx.commit().context("commit table import")?;
    Ok((tables.matches().len(), tables.deliveries().len()))
}

struct RawDelivery {
    match_id: i64,
    inning: i64,
    batting_team: String,
    bowling_team: String,
    over: i64,
    ball: i64,
    batter: String,
    bowler: String,
    non_striker: String,
    batsman_runs: i64,
    extra_runs: i64,
    total_runs: i64,
    is_wicket: bool,
    player_dismissed: Option<String>,
    dismissal_kind: Option<String>,
}

impl RawDelivery {
    fn into_row(self) -> Result<DeliveryRow> {
        Ok(DeliveryRow {
            match_id: self.match_id,
            inning: non_negative(self.inning, "inning")?,
            batting_team: self.batting_team,
            bowling_team: self.bowling_team,
            over: non_negative(self.over, "over")?,
            ball: non_negative(self.ball, "ball")?,
            batter: self.batter,
            bowler: self.bowler,
            non_striker: self.non_striker,
            batsman_runs: non_negative(self.batsman_runs, "batsman_runs")?,
            extra_runs: non_negative(self.extra_runs, "extra_runs")?,
            total_runs: non_negative(self.total_runs, "total_runs")?,
            is_wicket: self.is_wicket,
            player_dismissed: non_blank(self.player_dismissed),
            dismissal_kind: non_blank(self.dismissal_kind),
        })
    }
}

fn non_negative(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| anyhow!("{column} must be a non-negative integer, got {value}"))
}

// Cleaned exports use "NA" or empty strings for missing text.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| {
        let t = s.trim();
        !t.is_empty() && t != "NA"
    })
}

pub fn load_parquet(matches_path: &Path, deliveries_path: &Path) -> Result<Tables> {
    let matches = read_parquet_rows(matches_path, decode_match_row)?;
    let deliveries = read_parquet_rows(deliveries_path, decode_delivery_row)?;
    Tables::new(matches, deliveries).context("validate parquet tables")
}

fn read_parquet_rows<T>(path: &Path, decode: fn(&NamedRow<'_>) -> Result<T>) -> Result<Vec<T>> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = SerializedFileReader::new(file)
        .with_context(|| format!("open parquet reader {}", path.display()))?;
    let iter = reader
        .get_row_iter(None)
        .with_context(|| format!("iterate rows of {}", path.display()))?;

    let mut out = Vec::new();
    for (idx, row) in iter.enumerate() {
        let row = row.with_context(|| format!("read row #{idx} of {}", path.display()))?;
        let named = NamedRow::new(&row);
        out.push(decode(&named).with_context(|| format!("row #{idx} of {}", path.display()))?);
    }
    Ok(out)
}

fn decode_match_row(row: &NamedRow<'_>) -> Result<MatchRow> {
    let match_id = row.int("match_id")?;
    Ok(MatchRow {
        match_id,
        season: row.text("season")?,
        city: non_blank(row.opt_text("city")?),
        venue: row.text("venue")?,
        team1: row.text("team1")?,
        team2: row.text("team2")?,
        toss_winner: row.text("toss_winner")?,
        toss_decision: row.text("toss_decision")?.parse()?,
        winner: non_blank(row.opt_text("winner")?),
        result: row.text("result")?.parse()?,
        result_margin: row.opt_float("result_margin")?,
        target_runs: row.opt_float("target_runs")?,
    })
}

fn decode_delivery_row(row: &NamedRow<'_>) -> Result<DeliveryRow> {
    RawDelivery {
        match_id: row.int("match_id")?,
        inning: row.int("inning")?,
        batting_team: row.text("batting_team")?,
        bowling_team: row.text("bowling_team")?,
        over: row.int("over")?,
        ball: row.int("ball")?,
        batter: row.text("batter")?,
        bowler: row.text("bowler")?,
        non_striker: row.text("non_striker")?,
        batsman_runs: row.int("batsman_runs")?,
        extra_runs: row.int("extra_runs")?,
        total_runs: row.int("total_runs")?,
        is_wicket: row.flag("is_wicket")?,
        player_dismissed: row.opt_text("player_dismissed")?,
        dismissal_kind: row.opt_text("dismissal_kind")?,
    }
    .into_row()
}

/// Column-name access over a parquet record.
struct NamedRow<'a> {
    fields: HashMap<&'a str, &'a Field>,
}

impl<'a> NamedRow<'a> {
    fn new(row: &'a Row) -> Self {
        Self {
            fields: row
                .get_column_iter()
                .map(|(name, field)| (name.as_str(), field))
                .collect(),
        }
    }

    fn field(&self, column: &str) -> Result<Option<&'a Field>> {
        let field = self
            .fields
            .get(column)
            .copied()
            .ok_or_else(|| anyhow!("missing column {column}"))?;
        Ok((!matches!(field, Field::Null)).then_some(field))
    }

    fn text(&self, column: &str) -> Result<String> {
        self.opt_text(column)?
            .ok_or_else(|| anyhow!("column {column} is null"))
    }

    fn opt_text(&self, column: &str) -> Result<Option<String>> {
        let Some(field) = self.field(column)? else {
            return Ok(None);
        };
        field_text(field)
            .map(Some)
            .ok_or_else(|| anyhow!("column {column} is not text"))
    }

    fn int(&self, column: &str) -> Result<i64> {
        let field = self
            .field(column)?
            .ok_or_else(|| anyhow!("column {column} is null"))?;
        field_int(field).ok_or_else(|| anyhow!("column {column} is not an integer"))
    }

    fn opt_float(&self, column: &str) -> Result<Option<f64>> {
        let Some(field) = self.field(column)? else {
            return Ok(None);
        };
        // pandas writes missing floats as NaN rather than null
        if let Field::Double(v) = field
            && v.is_nan()
        {
            return Ok(None);
        }
        field_float(field)
            .map(Some)
            .ok_or_else(|| anyhow!("column {column} is not numeric"))
    }

    fn flag(&self, column: &str) -> Result<bool> {
        let field = self
            .field(column)?
            .ok_or_else(|| anyhow!("column {column} is null"))?;
        field_flag(field).ok_or_else(|| anyhow!("column {column} is not a 0/1 flag"))
    }
}

fn field_text(field: &Field) -> Option<String> {
    match field {
        Field::Str(s) => Some(s.clone()),
        // Seasons are sometimes exported as plain integers.
        Field::Int(_) | Field::Long(_) | Field::Short(_) => field_int(field).map(|n| n.to_string()),
        _ => None,
    }
}

fn field_int(field: &Field) -> Option<i64> {
    match field {
        Field::Byte(n) => Some(i64::from(*n)),
        Field::Short(n) => Some(i64::from(*n)),
        Field::Int(n) => Some(i64::from(*n)),
        Field::Long(n) => Some(*n),
        Field::UByte(n) => Some(i64::from(*n)),
        Field::UShort(n) => Some(i64::from(*n)),
        Field::UInt(n) => Some(i64::from(*n)),
        Field::ULong(n) => i64::try_from(*n).ok(),
        Field::Double(v) if v.fract() == 0.0 => Some(*v as i64),
        Field::Float(v) if v.fract() == 0.0 => Some(*v as i64),
        Field::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_float(field: &Field) -> Option<f64> {
    match field {
        Field::Double(v) => v.is_finite().then_some(*v),
        Field::Float(v) => v.is_finite().then_some(f64::from(*v)),
        Field::Str(s) => s.trim().parse().ok(),
        other => field_int(other).map(|n| n as f64),
    }
}

fn field_flag(field: &Field) -> Option<bool> {
    match field {
        Field::Bool(b) => Some(*b),
        other => match field_int(other)? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        },
    }
}
