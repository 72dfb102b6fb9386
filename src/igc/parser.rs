//! IGC flight recorder format: A (logger), H (header) and B (fix) records.
//! Every other record type is skipped.

use chrono::{NaiveDate, NaiveTime};

use crate::igc::ParseError;
use crate::track::{Point, Track};

const B_RECORD_MIN_LEN: usize = 35;

#[derive(Debug, Default)]
struct Header {
    unique_id: Option<String>,
    date: Option<NaiveDate>,
    pilot: String,
    glider_type: String,
    glider_id: String,
}

/// Parse the text of an IGC file into a [`Track`].
pub fn parse_igc(text: &str) -> Result<Track, ParseError> {
    let mut header = Header::default();
    let mut points = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end_matches('\r');
        match line.as_bytes().first() {
            Some(b'A') if header.unique_id.is_none() => {
                header.unique_id = Some(parse_a_record(line, line_no)?);
            }
            Some(b'H') => parse_h_record(line, line_no, &mut header)?,
            Some(b'B') => points.push(parse_b_record(line, line_no)?),
            _ => {}
        }
    }

    let id = header.unique_id.ok_or(ParseError::MissingRecord("A"))?;
    let date = header.date.ok_or(ParseError::MissingRecord("HFDTE"))?;
    tracing::debug!(track_id = %id, fixes = points.len(), "parsed IGC file");

    Ok(Track {
        id,
        pilot: header.pilot,
        glider_type: header.glider_type,
        glider_id: header.glider_id,
        recorded_at: date.and_time(NaiveTime::MIN).and_utc(),
        points,
    })
}

fn invalid(line: usize, reason: impl Into<String>) -> ParseError {
    ParseError::InvalidRecord {
        line,
        reason: reason.into(),
    }
}

/// `A MMM UUU ...`: three-letter manufacturer code, then the logger's unique id.
fn parse_a_record(line: &str, line_no: usize) -> Result<String, ParseError> {
    let unique_id = line
        .get(4..7)
        .ok_or_else(|| invalid(line_no, "A record too short for a logger id"))?;
    let unique_id = unique_id.trim();
    if unique_id.is_empty() {
        return Err(invalid(line_no, "A record has a blank logger id"));
    }
    Ok(unique_id.to_string())
}

fn parse_h_record(line: &str, line_no: usize, header: &mut Header) -> Result<(), ParseError> {
    let Some(code) = line.get(2..5) else {
        return Ok(());
    };
    let rest = line.get(5..).unwrap_or("");
    let value = match rest.split_once(':') {
        Some((_, value)) => value.trim(),
        None => rest.trim(),
    };

    match code {
        "DTE" => header.date = Some(parse_date(value, line_no)?),
        "PLT" => header.pilot = value.to_string(),
        "GTY" => header.glider_type = value.to_string(),
        "GID" => header.glider_id = value.to_string(),
        _ => {}
    }
    Ok(())
}

/// `DDMMYY`, optionally followed by `,NN` (flight number of the day).
fn parse_date(value: &str, line_no: usize) -> Result<NaiveDate, ParseError> {
    let digits = value
        .get(..6)
        .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| invalid(line_no, format!("malformed date '{value}'")))?;
    let day: u32 = parse_num(&digits[0..2], line_no)?;
    let month: u32 = parse_num(&digits[2..4], line_no)?;
    let yy: i32 = parse_num(&digits[4..6], line_no)?;
    let year = if yy < 80 { 2000 + yy } else { 1900 + yy };
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| invalid(line_no, format!("date '{digits}' out of range")))
}

/// `B HHMMSS DDMMmmmN DDDMMmmmE V PPPPP GGGGG`
fn parse_b_record(line: &str, line_no: usize) -> Result<Point, ParseError> {
    if !line.is_ascii() {
        return Err(invalid(line_no, "B record contains non-ASCII bytes"));
    }
    if line.len() < B_RECORD_MIN_LEN {
        return Err(invalid(line_no, "B record too short"));
    }

    let hour: u32 = parse_num(&line[1..3], line_no)?;
    let minute: u32 = parse_num(&line[3..5], line_no)?;
    let second: u32 = parse_num(&line[5..7], line_no)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| invalid(line_no, format!("time '{}' out of range", &line[1..7])))?;

    let latitude = parse_coordinate(&line[7..14], 2, 90, &line[14..15], ('N', 'S'), line_no)?;
    let longitude = parse_coordinate(&line[15..23], 3, 180, &line[23..24], ('E', 'W'), line_no)?;

    let valid = match &line[24..25] {
        "A" => true,
        "V" => false,
        other => return Err(invalid(line_no, format!("unknown fix validity '{other}'"))),
    };
    let pressure_altitude = parse_num(&line[25..30], line_no)?;
    let gnss_altitude = parse_num(&line[30..35], line_no)?;

    Ok(Point {
        time,
        latitude,
        longitude,
        pressure_altitude,
        gnss_altitude,
        valid,
    })
}

/// Degrees (`degree_digits` wide), then minutes with three implied decimals.
fn parse_coordinate(
    digits: &str,
    degree_digits: usize,
    max_degrees: u32,
    hemisphere: &str,
    (positive, negative): (char, char),
    line_no: usize,
) -> Result<f64, ParseError> {
    let degrees: u32 = parse_num(&digits[..degree_digits], line_no)?;
    let thousandths_of_minute: u32 = parse_num(&digits[degree_digits..], line_no)?;
    if thousandths_of_minute >= 60_000 {
        return Err(invalid(line_no, format!("minutes in '{digits}' out of range")));
    }
    let value = f64::from(degrees) + f64::from(thousandths_of_minute) / 1000.0 / 60.0;
    if value > f64::from(max_degrees) {
        return Err(invalid(line_no, format!("coordinate '{digits}' out of range")));
    }
    match hemisphere.chars().next() {
        Some(c) if c == positive => Ok(value),
        Some(c) if c == negative => Ok(-value),
        _ => Err(invalid(line_no, format!("bad hemisphere '{hemisphere}'"))),
    }
}

/// Fixed-width decimal field. Only a leading `-` is allowed besides digits.
fn parse_num<T: std::str::FromStr>(field: &str, line_no: usize) -> Result<T, ParseError> {
    let digits = field.strip_prefix('-').unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(line_no, format!("'{field}' is not a number")));
    }
    field
        .parse()
        .map_err(|_| invalid(line_no, format!("'{field}' is not a number")))
}
