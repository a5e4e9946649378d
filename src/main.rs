use anyhow::{bail, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use toolgrid::calculators::{self, LengthUnit, ScientificFn, Sex, TaxReport, TaxSlab};
use toolgrid::timezone::format_offset;
use toolgrid::{
    AgeForm, CalendarDate, Instant, LocalTimePolicy, OffsetLookup, Settings, TimeZoneConverter,
    TimeZoneForm, TzDatabase, ZoneId,
};

#[derive(Parser)]
#[command(name = "toolgrid", version, about = "Everyday calculators: age, time zones, health, money")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Settings file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Years, months and days between a birth date and a reference date
    Age {
        birth: String,
        /// Defaults to today
        reference: Option<String>,
    },
    /// Convert a wall-clock time between two IANA zones
    Tz {
        date: String,
        time: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        /// reject, prefer-standard or one-step
        #[arg(long)]
        policy: Option<LocalTimePolicy>,
    },
    /// List configured zones with their current offset
    Zones {
        /// Every zone in the database instead of the configured list
        #[arg(long)]
        all: bool,
    },
    /// Body mass index
    Bmi {
        #[command(subcommand)]
        units: BmiUnits,
    },
    /// Body fat percentage (U.S. Navy method)
    BodyFat {
        sex: Sex,
        /// cm or in
        #[arg(long, default_value = "cm")]
        units: LengthUnit,
        #[arg(long)]
        height: f64,
        #[arg(long)]
        neck: f64,
        #[arg(long)]
        waist: f64,
        /// Required for female
        #[arg(long)]
        hip: Option<f64>,
    },
    /// Monthly installment for an amortized loan
    Loan { principal: f64, rate: f64, years: f64 },
    /// Simple interest, or compound with --compound-per-year
    Interest {
        principal: f64,
        rate: f64,
        years: f64,
        #[arg(long)]
        compound_per_year: Option<u32>,
    },
    /// Sale price from a discount, or the discount from a sale price
    Discount {
        price: f64,
        #[arg(long, conflicts_with = "final_price", required_unless_present = "final_price")]
        percent: Option<f64>,
        #[arg(long = "final")]
        final_price: Option<f64>,
    },
    /// Percentage helpers
    Percent {
        #[command(subcommand)]
        mode: PercentMode,
    },
    /// Income tax, flat or progressive slabs
    Tax {
        income: f64,
        #[arg(long, conflicts_with = "slab")]
        flat: Option<f64>,
        /// UPTO:RATE, repeatable, in ascending order
        #[arg(long)]
        slab: Vec<TaxSlab>,
    },
    /// Name compatibility
    Love { first: String, second: String },
    /// Evaluate an arithmetic expression, optionally through sin/cos/tan/sqrt/square/log
    Calc {
        #[arg(allow_hyphen_values = true)]
        expression: String,
        #[arg(long = "fn")]
        function: Option<ScientificFn>,
    },
    /// Interactive terminal UI
    #[cfg(feature = "tui")]
    Ui,
}

#[derive(Subcommand)]
enum BmiUnits {
    Metric { height_cm: f64, weight_kg: f64 },
    Imperial { feet: f64, inches: f64, pounds: f64 },
}

#[derive(Subcommand)]
enum PercentMode {
    /// What percent VALUE is of TOTAL
    Of { value: f64, total: f64 },
    /// What PERCENT of TOTAL is
    Value { percent: f64, total: f64 },
}

#[derive(Serialize)]
struct ZoneRow {
    zone: String,
    offset_minutes: i32,
    offset: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    settings.validate(&TzDatabase)?;
    let today = CalendarDate::from_naive(Local::now().date_naive());
    debug!(%today, policy = %settings.local_time_policy, "settings loaded");

    run(cli.command, cli.json, settings, today)
}

fn run(command: Command, json: bool, settings: Settings, today: CalendarDate) -> Result<()> {
    match command {
        Command::Age { birth, reference } => {
            let report = AgeForm::new(birth, reference.unwrap_or_default()).submit(today)?;
            if json {
                print_json(&report)?;
            } else {
                println!("📅 Age: {}", report.age);
                println!("   from {} to {}", report.birth, report.reference);
            }
        }

        Command::Tz { date, time, from, to, policy } => {
            let converter = TimeZoneConverter::new(TzDatabase)
                .with_policy(policy.unwrap_or(settings.local_time_policy));
            let form = TimeZoneForm {
                date,
                time,
                from_zone: from.unwrap_or_else(|| settings.default_from_zone.clone()),
                to_zone: to.unwrap_or_else(|| settings.default_to_zone.clone()),
            };
            let report = form.submit(&converter)?;
            if json {
                print_json(&report)?;
            } else {
                println!("🌍 {}", report.time_only());
                println!("   {}", report);
            }
        }

        Command::Zones { all } => {
            let now = Instant::from_millis(Utc::now().timestamp_millis());
            let names: Vec<String> = if all {
                TzDatabase::zone_names().map(str::to_string).collect()
            } else {
                settings.common_zones.clone()
            };

            let mut rows = Vec::with_capacity(names.len());
            for zone in names {
                let offset_minutes = TzDatabase.offset_minutes(now, &ZoneId::from(zone.as_str()))?;
                rows.push(ZoneRow {
                    offset: format_offset(offset_minutes),
                    zone,
                    offset_minutes,
                });
            }

            if json {
                print_json(&rows)?;
            } else {
                for row in &rows {
                    println!("{:<32} {}", row.zone, row.offset);
                }
            }
        }

        Command::Bmi { units } => {
            let bmi = match units {
                BmiUnits::Metric { height_cm, weight_kg } => calculators::bmi_metric(height_cm, weight_kg)?,
                BmiUnits::Imperial { feet, inches, pounds } => {
                    calculators::bmi_imperial(feet, inches, pounds)?
                }
            };
            if json {
                print_json(&bmi)?;
            } else {
                println!("⚖️  BMI: {:.2} ({})", bmi.value, bmi.category);
            }
        }

        Command::BodyFat { sex, units, height, neck, waist, hip } => {
            let body_fat = calculators::body_fat_navy(sex, units, height, neck, waist, hip)?;
            if json {
                print_json(&body_fat)?;
            } else {
                println!("💪 Body fat: {:.2}% ({})", body_fat.percent, body_fat.class);
            }
        }

        Command::Loan { principal, rate, years } => {
            let loan = calculators::loan_emi(principal, rate, years)?;
            if json {
                print_json(&loan)?;
            } else {
                println!("🏦 Monthly payment: {:.2}", loan.emi);
                println!("   Total payable:   {:.2} over {} months", loan.total_payable, loan.months);
                println!("   Total interest:  {:.2}", loan.total_interest);
            }
        }

        Command::Interest { principal, rate, years, compound_per_year } => {
            let interest = match compound_per_year {
                Some(n) => calculators::compound_interest(principal, rate, years, n)?,
                None => calculators::simple_interest(principal, rate, years)?,
            };
            if json {
                print_json(&interest)?;
            } else {
                println!("💰 Interest: {:.2}", interest.interest);
                println!("   Total:    {:.2}", interest.total);
            }
        }

        Command::Discount { price, percent, final_price } => {
            let discount = match (percent, final_price) {
                (Some(pct), _) => calculators::apply_discount(price, pct)?,
                (None, Some(sale)) => calculators::reverse_discount(price, sale)?,
                (None, None) => bail!("Give either --percent or --final"),
            };
            if json {
                print_json(&discount)?;
            } else {
                println!("🏷️  {:.2} at {:.2}% off = {:.2}", discount.original, discount.percent, discount.final_price);
                println!("   You save {:.2}", discount.savings);
            }
        }

        Command::Percent { mode } => {
            let (label, value) = match mode {
                PercentMode::Of { value, total } => ("percent", calculators::percent_of(value, total)?),
                PercentMode::Value { percent, total } => {
                    ("value", calculators::value_from_percent(percent, total)?)
                }
            };
            if json {
                print_json(&BTreeMap::from([(label, value)]))?;
            } else if label == "percent" {
                println!("{:.2}%", value);
            } else {
                println!("{:.2}", value);
            }
        }

        Command::Tax { income, flat, slab } => {
            let report = match flat {
                Some(rate) => calculators::tax_flat(income, rate)?,
                None if !slab.is_empty() => calculators::tax_slabs(income, &slab)?,
                None => bail!("Give either --flat RATE or at least one --slab UPTO:RATE"),
            };
            if json {
                print_json(&report)?;
            } else {
                print_tax(&report);
            }
        }

        Command::Love { first, second } => {
            let result = calculators::compatibility(&first, &second)?;
            if json {
                print_json(&result)?;
            } else {
                println!("💘 {}%", result.percent);
                println!("   {}", result.message);
            }
        }

        Command::Calc { expression, function } => {
            let calculation = calculators::calculate(&expression, function)?;
            if json {
                print_json(&calculation)?;
            } else {
                println!("🧮 {}", calculation);
            }
        }

        #[cfg(feature = "tui")]
        Command::Ui => {
            let mut app = toolgrid::ui::App::new(settings, today);
            toolgrid::ui::run_ui(&mut app)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_tax(report: &TaxReport) {
    println!("🧾 Tax: {:.2} (effective {:.2}%)", report.tax, report.effective_rate);
    for band in &report.breakdown {
        println!("   {:>12.2} @ {:>5.2}% = {:.2}", band.on, band.rate, band.tax);
    }
}
