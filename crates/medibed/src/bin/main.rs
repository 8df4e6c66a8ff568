//! Medibed command-line interface

use anyhow::Result;
use clap::{Parser, Subcommand};
use medibed::cli::output::{self, OutputFormat};
use medibed::cli::{Session, SessionConfig, ambulances, bookings, hospitals};
use medibed::engine::WorkflowAction;
use medibed::types::{AmbulanceType, BedCount, BedType, BookingForm, BookingStatus, City, Condition};
use std::path::PathBuf;

/// Hospital bed and ambulance booking
#[derive(Parser)]
#[command(name = "medibed")]
#[command(author, version, about = "Hospital bed and ambulance booking", long_about = None)]
struct Cli {
    /// Verbose output (debug logging; RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Store snapshot file
    #[arg(short, long, default_value = "medibed.json", global = true)]
    data: PathBuf,

    /// Email of the acting user
    #[arg(short, long, default_value = "patient@medibed.local", global = true)]
    user: String,

    /// Full name of the acting user
    #[arg(long, global = true)]
    name: Option<String>,

    /// Place the user at a city center
    #[arg(long, global = true)]
    city: Option<City>,

    /// User latitude (with --lng)
    #[arg(long, global = true, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// User longitude (with --lat)
    #[arg(long, global = true, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Approve bookings even when the category has no free bed
    #[arg(long, global = true)]
    allow_overcommit: bool,

    /// Do not audit patient-side actions
    #[arg(long, global = true)]
    no_patient_audit: bool,

    /// Retries of a bed-count write that lost a race
    #[arg(long, global = true)]
    max_update_attempts: Option<u32>,

    /// Output format (json, table, pretty)
    #[arg(short = 'f', long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill an empty store from a hospital document and generate a fleet
    Seed {
        /// JSON file with `{ "hospitals": [...] }`
        file: PathBuf,

        /// Seed for fleet generation
        #[arg(long, default_value_t = 42)]
        rng_seed: u64,
    },

    /// List active hospitals, nearest first
    Hospitals {
        /// Only hospitals with a free bed of this type
        #[arg(long)]
        free: Option<BedType>,
    },

    /// Overwrite bed counts of a hospital (as available/total)
    Beds {
        hospital_id: String,

        #[arg(long)]
        icu: Option<BedCount>,

        #[arg(long)]
        general: Option<BedCount>,

        #[arg(long)]
        emergency: Option<BedCount>,

        #[arg(long)]
        ventilator: Option<BedCount>,
    },

    /// Request a bed
    Book {
        hospital_id: String,

        /// Patient name
        #[arg(long)]
        patient: String,

        #[arg(long, default_value = "")]
        phone: String,

        /// Emergency, Serious or Normal
        #[arg(long, default_value = "Normal")]
        condition: Condition,

        /// ICU, General, Emergency or Ventilator
        #[arg(long)]
        bed_type: BedType,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Approve a pending booking
    Approve { booking_id: String },

    /// Reject a pending booking
    Reject { booking_id: String },

    /// Discharge an admitted patient
    Discharge { booking_id: String },

    /// List bookings of a hospital, or your own
    Bookings {
        #[arg(long)]
        hospital: Option<String>,

        #[arg(long)]
        status: Option<BookingStatus>,
    },

    /// Discharge records of a hospital
    Discharges { hospital_id: String },

    /// Available ambulances nearest first
    Ambulances {
        /// BLS or ALS
        #[arg(long = "type")]
        ambulance_type: Option<AmbulanceType>,

        /// Include ambulances outside the dispatch radius
        #[arg(long)]
        all: bool,
    },

    /// Book an ambulance to your location
    BookAmbulance { ambulance_id: String },

    /// Your ambulance trips
    Trips,

    /// Ambulance trips bound for a hospital
    Inbound { hospital_id: String },

    /// Dashboard figures of a hospital
    Analytics { hospital_id: String },

    /// Audit trail of a hospital
    Audit { hospital_id: String },

    /// Print the availability snapshot the assistant answers from
    Context,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = SessionConfig {
        data: cli.data,
        user: cli.user,
        name: cli.name,
        city: cli.city,
        lat: cli.lat,
        lng: cli.lng,
        allow_overcommit: cli.allow_overcommit,
        no_patient_audit: cli.no_patient_audit,
        max_update_attempts: cli.max_update_attempts,
        format: cli.format,
        output: cli.output,
    };
    let session = Session::open(config)?;

    match cli.command {
        Commands::Seed { file, rng_seed } => hospitals::seed(&session, &file, rng_seed).await,
        Commands::Hospitals { free } => hospitals::list(&session, cli.city, free).await,
        Commands::Beds {
            hospital_id,
            icu,
            general,
            emergency,
            ventilator,
        } => {
            let updates = [
                (BedType::Icu, icu),
                (BedType::General, general),
                (BedType::Emergency, emergency),
                (BedType::Ventilator, ventilator),
            ];
            hospitals::set_beds(&session, &hospital_id, &updates).await
        }
        Commands::Book {
            hospital_id,
            patient,
            phone,
            condition,
            bed_type,
            notes,
        } => {
            let form = BookingForm {
                patient_name: patient,
                patient_phone: phone,
                condition_type: condition,
                bed_type,
                notes,
            };
            bookings::book(&session, &hospital_id, &form).await
        }
        Commands::Approve { booking_id } => {
            bookings::decide(&session, WorkflowAction::Approve, &booking_id).await
        }
        Commands::Reject { booking_id } => {
            bookings::decide(&session, WorkflowAction::Reject, &booking_id).await
        }
        Commands::Discharge { booking_id } => bookings::discharge(&session, &booking_id).await,
        Commands::Bookings { hospital, status } => {
            bookings::list(&session, hospital.as_deref(), status).await
        }
        Commands::Discharges { hospital_id } => bookings::discharges(&session, &hospital_id).await,
        Commands::Ambulances {
            ambulance_type,
            all,
        } => ambulances::list(&session, ambulance_type, all).await,
        Commands::BookAmbulance { ambulance_id } => ambulances::book(&session, &ambulance_id).await,
        Commands::Trips => ambulances::trips(&session).await,
        Commands::Inbound { hospital_id } => ambulances::inbound(&session, &hospital_id).await,
        Commands::Analytics { hospital_id } => hospitals::analytics(&session, &hospital_id).await,
        Commands::Audit { hospital_id } => hospitals::audit(&session, &hospital_id).await,
        Commands::Context => ambulances::context(&session).await,
    }
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
