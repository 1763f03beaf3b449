//! Line-driven target marking session.
//!
//! Stands in for a clickable image window: the operator types pixel
//! coordinates read off an image viewer.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use dronegeo_core::target::{photo_file_name, ClickCollector, PointList, TargetAggregator};
use dronegeo_core::{heading_from_bearing, ResolvedPhoto};
use tracing::debug;

/// Per-session camera settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub folder: PathBuf,
    /// Height above ground; the configured default applies when `None`.
    pub altitude_m: Option<f64>,
    /// Counter-clockwise from north.
    pub heading_deg: f64,
    /// Prefer the photo's recorded image direction over `heading_deg`.
    pub heading_from_exif: bool,
}

/// One parsed line of click input.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ClickCommand {
    Add(f64, f64),
    Remove(f64, f64),
    List,
    Done,
}

fn parse_pair<'a>(mut parts: impl Iterator<Item = &'a str>) -> Option<(f64, f64)> {
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((x, y))
}

fn parse_click(line: &str) -> Option<ClickCommand> {
    let line = line.replace(',', " ");
    let mut parts = line.split_whitespace();
    match parts.next() {
        None | Some("done") => Some(ClickCommand::Done),
        Some("ls") => parts.next().is_none().then_some(ClickCommand::List),
        Some("rm") => parse_pair(parts).map(|(x, y)| ClickCommand::Remove(x, y)),
        Some(first) => {
            parse_pair(std::iter::once(first).chain(parts)).map(|(x, y)| ClickCommand::Add(x, y))
        }
    }
}

/// Prompt-and-answer loop over any line reader and writer.
pub struct Session<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one trimmed line; `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Run photos until the operator answers `n` or input ends.
    ///
    /// The continue prompt follows every ID, including rejected ones.
    pub fn run(&mut self, aggregator: &mut TargetAggregator, options: &SessionOptions) -> Result<()> {
        loop {
            let Some(id) = self.ask("image ID (4 digits): ")? else {
                break;
            };
            self.handle_id(aggregator, options, &id)?;

            match self.ask("continue? [y/n]: ")? {
                Some(answer) if answer.eq_ignore_ascii_case("n") => break,
                Some(_) => continue,
                None => break,
            }
        }
        Ok(())
    }

    fn handle_id(
        &mut self,
        aggregator: &mut TargetAggregator,
        options: &SessionOptions,
        id: &str,
    ) -> Result<()> {
        let Some(name) = photo_file_name(id) else {
            writeln!(self.output, "invalid image ID: {id:?}")?;
            return Ok(());
        };
        match ResolvedPhoto::from_path(options.folder.join(&name)) {
            Ok(photo) => self.mark_photo(aggregator, options, &photo),
            Err(e) => {
                writeln!(self.output, "cannot use {name}: {e}")?;
                Ok(())
            }
        }
    }

    fn mark_photo(
        &mut self,
        aggregator: &mut TargetAggregator,
        options: &SessionOptions,
        photo: &ResolvedPhoto,
    ) -> Result<()> {
        let heading_deg = match photo.bearing {
            Some(bearing) if options.heading_from_exif => heading_from_bearing(bearing),
            _ => options.heading_deg,
        };
        writeln!(
            self.output,
            "{}: {}x{} at ({}, {}) heading {heading_deg}",
            photo.file_name, photo.dims.width, photo.dims.height, photo.fix.lat, photo.fix.lon
        )?;
        writeln!(
            self.output,
            "enter \"x y\" to add, \"rm x y\" to remove, \"ls\" to list, blank line when done"
        )?;

        let mut points = PointList::new();
        while let Some(line) = self.ask("> ")? {
            match parse_click(&line) {
                Some(ClickCommand::Add(x, y)) => points.on_click(x, y),
                Some(ClickCommand::Remove(x, y)) => points.on_remove(x, y),
                Some(ClickCommand::List) => {
                    for (i, p) in points.as_slice().iter().enumerate() {
                        writeln!(self.output, "  {i}: ({}, {})", p.x, p.y)?;
                    }
                }
                Some(ClickCommand::Done) => break,
                None => writeln!(self.output, "unrecognized input: {line:?}")?,
            }
        }
        debug!(photo = %photo.file_name, points = points.len(), "clicks collected");

        let geometry = aggregator.geometry(options.altitude_m, heading_deg);
        let outcome = aggregator.add_photo(photo, &geometry, &points);
        writeln!(self.output, "{} target(s) added from {}", outcome.added, photo.file_name)?;
        for failure in &outcome.failures {
            writeln!(
                self.output,
                "  ({}, {}) not projected: {}",
                failure.click.x, failure.click.y, failure.error
            )?;
        }
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
