use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

use anyhow::{bail, Context};
use itertools::Itertools;

use crate::problem::Tournament;
use crate::schedule::Schedule;

/**
Schedules are stored as comma separated signed matrices, one round per line and one
column per team (the virtual bye team last, if any):

```text
3,4,-1,-2
-4,3,-2,1
```

`+k` means the column's team hosts team `k`, `-k` that it plays away at team `k`
(one-based). Empty lines and lines starting with `#` are skipped.
 */
pub fn load_schedule(path: impl Into<String>, tournament: Tournament) -> anyhow::Result<Schedule> {
    let path = path.into();
    let f = File::open(&path).with_context(|| format!("cannot open schedule {}", path))?;
    parse_schedule(BufReader::new(f), tournament).with_context(|| format!("invalid schedule {}", path))
}

pub fn parse_schedule(reader: impl BufRead, tournament: Tournament) -> anyhow::Result<Schedule> {
    let mut matrix: Vec<Vec<i64>> = Vec::new();
    for (num, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(',')
            .map(|it| it.trim().parse::<i64>())
            .collect::<Result<Vec<i64>, _>>()
            .with_context(|| format!("line {}: expected signed integers", num + 1))?;
        matrix.push(row);
    }
    if matrix.is_empty() {
        bail!("no rounds found");
    }
    Ok(Schedule::from_signed_matrix(tournament, &matrix)?)
}

pub fn write_schedule(path: impl Into<String>, schedule: &Schedule) -> anyhow::Result<()> {
    let path = path.into();
    let f = File::create(&path).with_context(|| format!("cannot create {}", path))?;
    let mut file = BufWriter::new(&f);
    write_rows(&mut file, schedule)?;
    file.flush()?;
    Ok(())
}

pub fn write_rows(writer: &mut impl Write, schedule: &Schedule) -> anyhow::Result<()> {
    for row in schedule.to_signed_matrix() {
        writeln!(writer, "{}", row.iter().join(","))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::construction::{construct, construct_with, InitialScheduleGeneration};
    use crate::utils::create_seeded_rng;

    #[test]
    fn written_rows_parse_back() -> anyhow::Result<()> {
        let schedule = construct(6)?;
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &schedule)?;
        let text = String::from_utf8(buffer)?;
        assert_eq!(text.lines().count(), 10);

        let parsed = parse_schedule(Cursor::new(text), schedule.tournament().clone())?;
        assert_eq!(parsed, schedule);
        Ok(())
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() -> anyhow::Result<()> {
        let text = "# four teams\n3,4,-1,-2\n-4,3,-2,1\n\n2,-1,4,-3\n-3,-4,1,2\n4,-3,2,-1\n-2,1,-4,3\n";
        let schedule = parse_schedule(Cursor::new(text), Tournament::with_even_teams(4)?)?;
        assert_eq!(schedule.num_rounds(), 6);
        assert_eq!(schedule.game(0, 0).to_signed(), 3);
        Ok(())
    }

    #[test]
    fn garbage_is_rejected() -> anyhow::Result<()> {
        let tournament = Tournament::with_even_teams(4)?;
        assert!(parse_schedule(Cursor::new("3,x,-1,-2\n"), tournament.clone()).is_err());
        assert!(parse_schedule(Cursor::new(""), tournament.clone()).is_err());
        // a single round is not a double round-robin
        assert!(parse_schedule(Cursor::new("3,4,-1,-2\n"), tournament).is_err());
        Ok(())
    }

    #[test]
    fn bye_columns_are_kept() -> anyhow::Result<()> {
        let tournament = Tournament::new(5, true)?;
        let schedule = construct_with(
            &tournament,
            &mut create_seeded_rng(0),
            InitialScheduleGeneration::RANDOMIZED_CIRCLE,
        );
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &schedule)?;
        let parsed = parse_schedule(Cursor::new(buffer), tournament)?;
        assert_eq!(parsed, schedule);
        Ok(())
    }
}
