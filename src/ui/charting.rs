/// Compute X (test number) and Y bounds for the history chart
pub fn compute_chart_params(wpm: &[(f64, f64)], accuracy: &[(f64, f64)]) -> (f64, f64) {
    // Accuracy is a percentage, so the Y axis never drops below 100
    let mut highest = 100.0;
    for &(_, y) in wpm.iter().chain(accuracy.iter()) {
        if y > highest {
            highest = y;
        }
    }

    let x_max = wpm.last().map_or(2.0, |p| p.0).max(2.0);

    (x_max, highest.round())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
