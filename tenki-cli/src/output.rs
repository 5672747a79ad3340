use tenki_core::{Field, Reading, RunOutcome, SummaryStats, format_date_time};

pub fn print_outcome(outcome: &RunOutcome) {
    let ex = &outcome.extraction;

    println!("Temperature:   {} {}", ex.temperature, Field::Temperature.unit());
    println!("Wind:          {} {}", ex.wind, Field::Wind.unit());
    println!("Precipitation: {} {}", ex.precipitation, Field::Precipitation.unit());
    if let Some(at) = ex.observed_at {
        println!("Observed at:   {}", at.format("%H:%M"));
    }

    match &outcome.stored {
        Some(row) => println!("Stored as row {} at {}", row.id, format_date_time(&row.created_at)),
        None => println!("Dry run: nothing stored"),
    }
}

pub fn print_stats(stats: &SummaryStats) {
    println!("Readings: {}", stats.count);
    if let Some(latest) = &stats.latest {
        println!("Latest:   {latest}");
    }

    for field in Field::ALL {
        if let Some(s) = stats.field(field) {
            println!(
                "{:<14} min {:.1}  max {:.1}  avg {:.1} {}",
                format!("{field}:"),
                s.min,
                s.max,
                s.mean,
                field.unit()
            );
        }
    }
    println!();
}

pub fn print_table(rows: &[&Reading]) {
    if rows.is_empty() {
        println!("No readings match.");
        return;
    }

    println!("{:<17}  {:>10}  {:>10}  {:>12}", "Date", "Temp (°C)", "Wind (m/s)", "Precip (mm)");
    for row in rows {
        println!(
            "{:<17}  {:>10}  {:>10}  {:>12}",
            format_date_time(&row.created_at),
            row.temperature,
            row.wind,
            row.precipitation
        );
    }
}
