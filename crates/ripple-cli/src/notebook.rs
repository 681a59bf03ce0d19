//! The built-in demo notebook.
//!
//! Data flow: `data` → `limit` slider → `slice` → `summary` markdown.

use ripple_core::{Cell, Outputs, Value};

/// Slider bounds for `limit`.
pub const LIMIT_MIN: i64 = 1;
pub const LIMIT_MAX: i64 = 100;

/// Build the slider notebook cells in declaration order.
pub fn slider_notebook() -> Vec<Cell> {
    vec![
        Cell::new("data", &[], &["x", "y"], |_| {
            let x: Vec<i64> = (1..=LIMIT_MAX).collect();
            let y: Vec<i64> = x.iter().map(|v| v * 2).collect();
            Ok(Outputs::single("x", x).with("y", y))
        }),
        Cell::input("limit", LIMIT_MIN),
        Cell::new(
            "slice",
            &["x", "y", "limit"],
            &["x_slice", "y_slice"],
            |inputs| {
                let limit = inputs.int("limit")?;
                if !(LIMIT_MIN..=LIMIT_MAX).contains(&limit) {
                    return Err(format!(
                        "limit must be between {LIMIT_MIN} and {LIMIT_MAX}, got {limit}"
                    )
                    .into());
                }
                let limit = limit as usize;
                let x = inputs.list("x")?;
                let y = inputs.list("y")?;
                Ok(Outputs::single("x_slice", Value::List(x[..limit].to_vec()))
                    .with("y_slice", Value::List(y[..limit].to_vec())))
            },
        ),
        Cell::new(
            "summary",
            &["limit", "x_slice", "y_slice"],
            &["summary"],
            |inputs| {
                let xs = inputs.list("x_slice")?;
                let ys = inputs.list("y_slice")?;
                let (Some(first_x), Some(first_y)) = (xs.first(), ys.first()) else {
                    return Err("slice is empty".into());
                };
                let (Some(last_x), Some(last_y)) = (xs.last(), ys.last()) else {
                    return Err("slice is empty".into());
                };
                let text = format!(
                    "### Showing **{}** data points\n\
                     First value: **{first_x}** → {first_y}\n\
                     Last value: **{last_x}** → {last_y}",
                    inputs.int("limit")?
                );
                Ok(Outputs::single("summary", text))
            },
        ),
    ]
}
