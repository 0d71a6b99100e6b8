//! Template rendering of weather records.
//!
//! Templates are Tera source read from the user. The record's fields are the
//! top-level variables, and three filters are registered:
//!
//! - `celsius` / `fahrenheit`: convert a Kelvin reading
//! - `temp`: format a number with one decimal place
//!
//! ```text
//! {{ name }}: {{ main.temp | celsius | temp }}C, {{ weather.0.description }}
//! ```

use std::collections::HashMap;
use std::error::Error as _;
use std::io::Write;

use tera::{Context, Tera, Value};
use thiserror::Error;

use crate::model::{Temperature, WeatherRecord};

const TEMPLATE_NAME: &str = "weather";

#[derive(Debug, Error)]
pub enum RenderError {
    /// Template source did not parse.
    #[error("Template compilation failed: {0}")]
    Compile(String),

    /// Template parsed but could not be evaluated against a record.
    #[error("Template rendering failed: {0}")]
    Render(String),

    #[error("Failed to write rendered output: {0}")]
    Io(#[from] std::io::Error),
}

/// A compiled user template plus its helper filters.
#[derive(Clone)]
pub struct WeatherTemplate {
    tera: Tera,
}

impl std::fmt::Debug for WeatherTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherTemplate").finish_non_exhaustive()
    }
}

impl WeatherTemplate {
    pub fn compile(source: &str) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.register_filter("temp", temp_filter);
        tera.register_filter("celsius", celsius_filter);
        tera.register_filter("fahrenheit", fahrenheit_filter);
        tera.add_raw_template(TEMPLATE_NAME, source)
            .map_err(|e| RenderError::Compile(describe(&e)))?;

        Ok(Self { tera })
    }

    /// Render into memory.
    pub fn render(&self, record: &WeatherRecord) -> Result<String, RenderError> {
        let ctx =
            Context::from_serialize(record).map_err(|e| RenderError::Render(describe(&e)))?;
        self.tera.render(TEMPLATE_NAME, &ctx).map_err(|e| RenderError::Render(describe(&e)))
    }

    /// Render and write to `sink`. Nothing is written if evaluation fails.
    pub fn render_to<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        record: &WeatherRecord,
    ) -> Result<(), RenderError> {
        let text = self.render(record)?;
        sink.write_all(text.as_bytes())?;
        Ok(())
    }
}

/// Format a temperature with exactly one decimal place.
pub fn format_temp(value: f64) -> String {
    format!("{value:.1}")
}

// tera::Error keeps the useful part ("Variable `x` not found") in its source chain.
fn describe(err: &tera::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

fn number_arg(value: &Value, filter: &str) -> tera::Result<f64> {
    value.as_f64().ok_or_else(|| tera::Error::msg(format!("{filter} requires a number, got {value}")))
}

fn temp_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(format_temp(number_arg(value, "temp")?)))
}

fn celsius_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let kelvin = number_arg(value, "celsius")?;
    Ok(Value::from(Temperature::from_kelvin(kelvin).celsius()))
}

fn fahrenheit_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let kelvin = number_arg(value, "fahrenheit")?;
    Ok(Value::from(Temperature::from_kelvin(kelvin).fahrenheit()))
}
