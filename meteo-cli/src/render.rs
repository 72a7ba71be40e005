//! Text and JSON output for weather results.

use chrono::{DateTime, FixedOffset};
use crossterm::style::Color;
use meteo_core::{
    CurrentConditions, DailyForecastEntry, ForecastResult, HourlyForecastEntry, Location,
    compass_from_degrees,
};
use serde::Serialize;
use std::io::{self, Write};

use crate::color::Palette;

/// Display treatment for a temperature, chosen by inclusive lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempBand {
    Hot,
    Warm,
    Mild,
    Cool,
    Cold,
}

impl TempBand {
    pub fn from_celsius(temp: f64) -> Self {
        match temp {
            t if t >= 30.0 => TempBand::Hot,
            t if t >= 20.0 => TempBand::Warm,
            t if t >= 10.0 => TempBand::Mild,
            t if t >= 0.0 => TempBand::Cool,
            _ => TempBand::Cold,
        }
    }

    pub fn color(self) -> Color {
        match self {
            TempBand::Hot => Color::Red,
            TempBand::Warm => Color::Yellow,
            TempBand::Mild => Color::Green,
            TempBand::Cool => Color::Cyan,
            TempBand::Cold => Color::Blue,
        }
    }
}

pub fn uv_level(uv: f64) -> &'static str {
    match uv {
        u if u < 3.0 => "low",
        u if u < 6.0 => "moderate",
        u if u < 8.0 => "high",
        u if u < 11.0 => "very high",
        _ => "extreme",
    }
}

/// Writes results either as pretty JSON or as human-formatted text.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    json: bool,
    palette: Palette,
}

impl Renderer {
    /// JSON output never carries styling, whatever `palette` says.
    pub fn new(json: bool, palette: Palette) -> Self {
        let palette = if json { Palette::plain() } else { palette };
        Self { json, palette }
    }

    pub fn current(&self, out: &mut impl Write, w: &CurrentConditions) -> io::Result<()> {
        if self.json {
            return write_json(out, w);
        }
        let c = &self.palette;

        writeln!(out, "{}", c.bold(&w.location.display_name()))?;
        writeln!(out, "{}\n", c.cyan(&format_time(w.time, "%a %b %-d, %Y %H:%M %:z")))?;

        writeln!(out, "{} {}", c.bold("Condition:"), w.condition)?;
        writeln!(out, "{} {}", c.bold("Temperature:"), self.temp(w.temperature))?;
        writeln!(out, "{} {}", c.bold("Feels like:"), self.temp(w.apparent))?;
        writeln!(out, "{} {}%", c.bold("Humidity:"), w.humidity)?;
        writeln!(
            out,
            "{} {:.1} km/h {}",
            c.bold("Wind:"),
            w.wind_speed,
            compass_from_degrees(w.wind_direction)
        )?;
        writeln!(out, "{} {:.0} hPa", c.bold("Pressure:"), w.pressure)?;
        writeln!(out, "{} {}%", c.bold("Cloud cover:"), w.cloud_cover)?;

        if w.precipitation > 0.0 {
            writeln!(out, "{} {:.1} mm", c.bold("Precipitation:"), w.precipitation)?;
        }
        if w.rain > 0.0 {
            writeln!(out, "{} {:.1} mm", c.bold("Rain:"), w.rain)?;
        }
        if w.snowfall > 0.0 {
            writeln!(out, "{} {:.1} cm", c.bold("Snowfall:"), w.snowfall)?;
        }
        if w.uv_index > 0.0 {
            writeln!(out, "{} {:.1} ({})", c.bold("UV Index:"), w.uv_index, uv_level(w.uv_index))?;
        }

        Ok(())
    }

    pub fn forecast(&self, out: &mut impl Write, f: &ForecastResult) -> io::Result<()> {
        if self.json {
            return write_json(out, f);
        }

        writeln!(out, "{}\n", self.palette.bold(&f.location.display_name()))?;

        for day in &f.daily {
            self.day(out, day)?;
        }
        for hour in &f.hourly {
            self.hour(out, hour)?;
        }

        Ok(())
    }

    pub fn locations(&self, out: &mut impl Write, locations: &[Location]) -> io::Result<()> {
        if self.json {
            return write_json(out, locations);
        }
        let c = &self.palette;

        for (i, loc) in locations.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, c.bold(&loc.display_name()))?;
            writeln!(
                out,
                "   {} {:.4}, {:.4}",
                c.cyan("Coordinates:"),
                loc.latitude,
                loc.longitude
            )?;
            if let Some(tz) = &loc.timezone {
                writeln!(out, "   {} {}", c.cyan("Timezone:"), tz)?;
            }
            writeln!(out)?;
        }

        Ok(())
    }

    fn day(&self, out: &mut impl Write, day: &DailyForecastEntry) -> io::Result<()> {
        let c = &self.palette;

        writeln!(out, "{}", c.bold(&day.date.format("%a %b %-d").to_string()))?;
        writeln!(out, "  {} {}", c.cyan("Condition:"), day.condition)?;
        writeln!(
            out,
            "  {} {} (high) / {} (low)",
            c.cyan("Temperature:"),
            self.temp(day.temp_max),
            self.temp(day.temp_min)
        )?;

        if day.precip_prob > 0 {
            writeln!(out, "  {} {}%", c.cyan("Precipitation:"), day.precip_prob)?;
        }
        if day.rain > 0.0 {
            writeln!(out, "  {} {:.1} mm", c.cyan("Rain:"), day.rain)?;
        }
        if day.snowfall > 0.0 {
            writeln!(out, "  {} {:.1} cm", c.cyan("Snowfall:"), day.snowfall)?;
        }

        writeln!(
            out,
            "  {} {:.1} km/h {}",
            c.cyan("Wind:"),
            day.wind_speed_max,
            compass_from_degrees(day.wind_direction)
        )?;
        writeln!(
            out,
            "  {} {} → {}",
            c.cyan("Sun:"),
            format_time(day.sunrise, "%H:%M"),
            format_time(day.sunset, "%H:%M")
        )?;

        if day.uv_index_max > 0.0 {
            writeln!(
                out,
                "  {} {:.1} ({})",
                c.cyan("UV Index:"),
                day.uv_index_max,
                uv_level(day.uv_index_max)
            )?;
        }
        writeln!(out)
    }

    fn hour(&self, out: &mut impl Write, hour: &HourlyForecastEntry) -> io::Result<()> {
        let c = &self.palette;

        writeln!(out, "{}", c.bold(&format_time(hour.time, "%a %b %-d %H:%M")))?;
        writeln!(out, "  {} {}", c.cyan("Condition:"), hour.condition)?;
        writeln!(
            out,
            "  {} {} (feels {})",
            c.cyan("Temperature:"),
            self.temp(hour.temperature),
            self.temp(hour.apparent)
        )?;
        writeln!(out, "  {} {}%", c.cyan("Humidity:"), hour.humidity)?;

        if hour.precip_prob > 0 {
            writeln!(out, "  {} {}%", c.cyan("Precipitation chance:"), hour.precip_prob)?;
        }
        if hour.precipitation > 0.0 {
            writeln!(out, "  {} {:.1} mm", c.cyan("Precipitation:"), hour.precipitation)?;
        }

        writeln!(
            out,
            "  {} {:.1} km/h {}",
            c.cyan("Wind:"),
            hour.wind_speed,
            compass_from_degrees(hour.wind_direction)
        )?;
        writeln!(out, "  {} {}%", c.cyan("Cloud cover:"), hour.cloud_cover)?;
        writeln!(out)
    }

    fn temp(&self, temp: f64) -> String {
        self.palette
            .paint(&format!("{temp:.1}°C"), TempBand::from_celsius(temp).color())
    }
}

fn format_time(time: Option<DateTime<FixedOffset>>, fmt: &str) -> String {
    time.map(|t| t.format(fmt).to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}
