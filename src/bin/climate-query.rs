use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use climate_data_processing::ingestion::{
    CompositeObserver, FileObserver, HeaderMode, LoadObserver, LoadOptions, LoadRequest, LoadSeverity,
    TracingObserver,
};
use climate_data_processing::processing::{
    average_metrics, find_extreme_events, find_high_co2_emitters, profile_metrics, rank_metric_by_country,
    search_by_country, search_by_year_range, sort_by_gdp, sort_by_temperature_anomaly, MetricAverage, RankOrder,
    RankedEntry, SortOrder,
};
use climate_data_processing::{Dataset, QueryResult, Record};

#[derive(Parser, Debug)]
#[command(
    name = "climate-query",
    version,
    about = "Interactive search, ranking and averaging over a climate indicators CSV"
)]
struct Cli {
    /// CSV file to load.
    #[arg(default_value = "data.csv")]
    path: PathBuf,
    /// Locate columns by name/substring instead of the alias table.
    #[arg(long)]
    detect_headers: bool,
    /// Skip rows with an empty country or a missing year.
    #[arg(long)]
    drop_incomplete: bool,
    /// Print results as JSON instead of tables.
    #[arg(long)]
    json: bool,
    /// Maximum records shown per listing (0 shows all).
    #[arg(long, default_value_t = 50)]
    rows: usize,
    /// Append load events to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

const MENU: &str = "
Climate Data Processing System
------------------------------
1) Search by country
2) Search by year range
3) Highest/lowest countries by extreme weather events
4) Top-N CO2 emitters in a year
5) Sort by temperature anomaly
6) Sort by GDP in a year
7) Average metrics for a country
8) Urbanization / deforestation for a country
9) Rank countries by any metric
0) Exit";

const AVERAGED_METRICS: [&str; 3] = ["co2_emissions", "temperature_anomaly", "gdp"];
const LAND_USE_METRICS: [&str; 2] = ["urbanization", "deforestation"];

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let request = LoadRequest {
        path: cli.path.clone(),
        options: load_options(&cli),
    };

    let started = Instant::now();
    let dataset = match request.run() {
        Ok(ds) => ds,
        Err(e) => {
            eprintln!("Failed to read {}: {e}", cli.path.display());
            return ExitCode::FAILURE;
        }
    };
    println!("Loaded {} rows in {:.3} ms", dataset.len(), elapsed_ms(started));
    if dataset.is_empty() {
        println!("No data rows loaded. Check CSV headers/data.");
    }
    let missing = dataset.schema().missing_fields();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|f| f.name()).collect();
        println!("Columns not found in {}: {}", cli.path.display(), names.join(", "));
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = Menu {
        dataset: &dataset,
        input: stdin.lock(),
        out: stdout.lock(),
        json: cli.json,
        rows: cli.rows,
    };
    match menu.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("io error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_options(cli: &Cli) -> LoadOptions {
    let mut observers: Vec<Arc<dyn LoadObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = cli.log_file.as_ref() {
        observers.push(Arc::new(FileObserver::new(path)));
    }
    LoadOptions {
        header_mode: if cli.detect_headers {
            HeaderMode::Detect
        } else {
            HeaderMode::Aliases
        },
        drop_incomplete_rows: cli.drop_incomplete,
        observer: Some(Arc::new(CompositeObserver::new(observers))),
        alert_at_or_above: LoadSeverity::Critical,
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e3
}

struct Menu<'a, R, W> {
    dataset: &'a Dataset,
    input: R,
    out: W,
    json: bool,
    rows: usize,
}

impl<R: BufRead, W: Write> Menu<'_, R, W> {
    fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.out, "{MENU}")?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                return Ok(());
            };
            match choice.as_str() {
                "1" => self.country_records()?,
                "2" => self.year_range()?,
                "3" => self.extreme_events()?,
                "4" => self.co2_emitters()?,
                "5" => self.temperature_sort()?,
                "6" => self.gdp_sort()?,
                "7" => self.averages()?,
                "8" => self.land_use()?,
                "9" => self.metric_ranking()?,
                "0" => {
                    writeln!(self.out, "Bye!")?;
                    return Ok(());
                }
                _ => writeln!(self.out, "Invalid option. Try again.")?,
            }
        }
    }

    fn country_records(&mut self) -> io::Result<()> {
        let Some(country) = self.prompt("Country: ")? else { return Ok(()) };
        let started = Instant::now();
        let result = search_by_country(self.dataset, &country);
        let ms = elapsed_ms(started);
        self.show_records(&format!("Records for {country}"), result)?;
        self.timing(ms)
    }

    fn year_range(&mut self) -> io::Result<()> {
        let Some(start) = self.prompt_number::<i64>("Start year: ")? else { return Ok(()) };
        let Some(end) = self.prompt_number::<i64>("End year: ")? else { return Ok(()) };
        let started = Instant::now();
        let result = search_by_year_range(self.dataset, start, end);
        let ms = elapsed_ms(started);
        self.show_records(&format!("Records from {start} to {end}"), result)?;
        self.timing(ms)
    }

    fn extreme_events(&mut self) -> io::Result<()> {
        let Some(count) = self.prompt_number::<usize>("How many countries? ")? else { return Ok(()) };
        let Some(order) = self.prompt_rank_order()? else { return Ok(()) };
        let Some(year) = self.prompt_optional_year()? else { return Ok(()) };
        let started = Instant::now();
        let result = find_extreme_events(self.dataset, year, Some(count), order);
        let ms = elapsed_ms(started);
        let scope = year.map_or_else(|| "all years".to_string(), |y| y.to_string());
        let title = format!("{} {count} by extreme weather events ({scope})", rank_label(order));
        self.show_ranking(&title, result)?;
        self.timing(ms)
    }

    fn co2_emitters(&mut self) -> io::Result<()> {
        let Some(year) = self.prompt_number::<i64>("Year: ")? else { return Ok(()) };
        let Some(count) = self.prompt_number::<usize>("Top N: ")? else { return Ok(()) };
        let started = Instant::now();
        let result = find_high_co2_emitters(self.dataset, year, Some(count));
        let ms = elapsed_ms(started);
        self.show_ranking(&format!("Top {count} CO2 emitters in {year}"), result)?;
        self.timing(ms)
    }

    fn temperature_sort(&mut self) -> io::Result<()> {
        let Some(order) = self.prompt_sort_order()? else { return Ok(()) };
        let started = Instant::now();
        let result = sort_by_temperature_anomaly(self.dataset, order);
        let ms = elapsed_ms(started);
        self.show_records(&format!("Sorted by temperature anomaly ({})", sort_label(order)), result)?;
        self.timing(ms)
    }

    fn gdp_sort(&mut self) -> io::Result<()> {
        let Some(year) = self.prompt_number::<i64>("Year: ")? else { return Ok(()) };
        let Some(order) = self.prompt_sort_order()? else { return Ok(()) };
        let started = Instant::now();
        let result = sort_by_gdp(self.dataset, year, order);
        let ms = elapsed_ms(started);
        self.show_records(&format!("GDP in {year} ({})", sort_label(order)), result)?;
        self.timing(ms)
    }

    fn averages(&mut self) -> io::Result<()> {
        let Some(country) = self.prompt("Country: ")? else { return Ok(()) };
        let started = Instant::now();
        let result = average_metrics(self.dataset, &country, &AVERAGED_METRICS);
        let ms = elapsed_ms(started);
        match result {
            Err(e) => writeln!(self.out, "Error: {e}")?,
            Ok(None) => writeln!(self.out, "Country not found.")?,
            Ok(Some(avg)) if self.json => self.write_json(&avg)?,
            Ok(Some(avg)) => {
                writeln!(self.out, "\n=== Average metrics for {country} ===")?;
                for (metric, value) in &avg {
                    writeln!(self.out, "{metric}: {value:.4}")?;
                }
            }
        }
        self.timing(ms)
    }

    fn land_use(&mut self) -> io::Result<()> {
        let Some(country) = self.prompt("Country: ")? else { return Ok(()) };
        let started = Instant::now();
        let result = profile_metrics(self.dataset, &country, &LAND_USE_METRICS);
        let ms = elapsed_ms(started);
        match result {
            Err(e) => writeln!(self.out, "Error: {e}")?,
            Ok(None) => writeln!(self.out, "No records for {country}")?,
            Ok(Some(profile)) if self.json => self.write_json(&profile)?,
            Ok(Some(profile)) => {
                writeln!(self.out, "\nUrbanization & deforestation for {country}:")?;
                for MetricAverage { metric, average } in &profile {
                    match average {
                        Some(v) => writeln!(self.out, "Average {metric}: {v:.4}")?,
                        None => writeln!(self.out, "{metric} column not found.")?,
                    }
                }
            }
        }
        self.timing(ms)
    }

    fn metric_ranking(&mut self) -> io::Result<()> {
        let Some(metric) = self.prompt("Metric (e.g. deforestation, gdp): ")? else { return Ok(()) };
        let Some(count) = self.prompt_number::<usize>("How many countries? ")? else { return Ok(()) };
        let Some(order) = self.prompt_rank_order()? else { return Ok(()) };
        let Some(year) = self.prompt_optional_year()? else { return Ok(()) };
        let started = Instant::now();
        let result = rank_metric_by_country(self.dataset, &metric, year, Some(count), order);
        let ms = elapsed_ms(started);
        self.show_ranking(&format!("{} {count} by {metric}", rank_label(order)), result)?;
        self.timing(ms)
    }

    fn show_records(&mut self, title: &str, result: QueryResult<Vec<&Record>>) -> io::Result<()> {
        let rows = match result {
            Ok(rows) => rows,
            Err(e) => return writeln!(self.out, "Error: {e}"),
        };
        if self.json {
            return self.write_json(&rows);
        }
        writeln!(self.out, "\n=== {title} ===")?;
        if rows.is_empty() {
            return writeln!(self.out, "No results.");
        }
        writeln!(self.out, "Country | Year | TempAnom | CO2 | GDP | Extreme | Population")?;
        let shown = if self.rows == 0 { rows.len() } else { self.rows.min(rows.len()) };
        for r in &rows[..shown] {
            writeln!(
                self.out,
                "{} | {} | {:.4} | {:.4} | {:.2} | {:.2} | {:.0}",
                r.country, r.year, r.temperature_anomaly, r.co2_emissions, r.gdp, r.extreme_weather_events, r.population
            )?;
        }
        if shown < rows.len() {
            writeln!(self.out, "... ({} more)", rows.len() - shown)?;
        }
        Ok(())
    }

    fn show_ranking(&mut self, title: &str, result: QueryResult<Vec<RankedEntry>>) -> io::Result<()> {
        let entries = match result {
            Ok(entries) => entries,
            Err(e) => return writeln!(self.out, "Error: {e}"),
        };
        if self.json {
            return self.write_json(&entries);
        }
        writeln!(self.out, "\n=== {title} ===")?;
        if entries.is_empty() {
            return writeln!(self.out, "(no results)");
        }
        for (i, e) in entries.iter().enumerate() {
            writeln!(self.out, "{}. {} -> {:.4}", i + 1, e.key, e.value)?;
        }
        Ok(())
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, value)?;
        writeln!(self.out)
    }

    fn timing(&mut self, ms: f64) -> io::Result<()> {
        writeln!(self.out, "Time: {ms:.3} ms")
    }

    /// Read one trimmed line; `None` on end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Re-prompts until the input parses; `None` on end of input.
    fn prompt_number<T: std::str::FromStr>(&mut self, label: &str) -> io::Result<Option<T>> {
        loop {
            let Some(raw) = self.prompt(label)? else { return Ok(None) };
            match raw.parse::<T>() {
                Ok(v) => return Ok(Some(v)),
                Err(_) => writeln!(self.out, "Invalid number.")?,
            }
        }
    }

    /// Blank input means every year.
    fn prompt_optional_year(&mut self) -> io::Result<Option<Option<i64>>> {
        loop {
            let Some(raw) = self.prompt("Year (blank for all years): ")? else { return Ok(None) };
            if raw.is_empty() {
                return Ok(Some(None));
            }
            match raw.parse::<i64>() {
                Ok(y) => return Ok(Some(Some(y))),
                Err(_) => writeln!(self.out, "Invalid year.")?,
            }
        }
    }

    fn prompt_rank_order(&mut self) -> io::Result<Option<RankOrder>> {
        let Some(raw) = self.prompt("Highest or lowest? [h/l]: ")? else { return Ok(None) };
        Ok(Some(if raw.to_ascii_lowercase().starts_with('l') {
            RankOrder::Lowest
        } else {
            RankOrder::Highest
        }))
    }

    fn prompt_sort_order(&mut self) -> io::Result<Option<SortOrder>> {
        let Some(raw) = self.prompt("Ascending or descending? [a/d]: ")? else { return Ok(None) };
        Ok(Some(SortOrder::from_ascending(raw.to_ascii_lowercase().starts_with('a'))))
    }
}

fn rank_label(order: RankOrder) -> &'static str {
    match order {
        RankOrder::Highest => "Top",
        RankOrder::Lowest => "Bottom",
    }
}

fn sort_label(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Ascending => "asc",
        SortOrder::Descending => "desc",
    }
}
