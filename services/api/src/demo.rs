use crate::infra::{DemoEmptiesSource, DemoScheduleSource, DEFAULT_DEMO_SEED};
use chrono::{Duration, Utc};
use clap::Args;
use standby_rank::config::AppConfig;
use standby_rank::error::AppError;
use standby_rank::recommend::{
    AgeBucket, RecommendRequest, RecommendResponse, RecommendationAssembler,
    RecommendationService, ReturnWindow, Traveler,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Departure airport (IATA code)
    #[arg(long, default_value = "SFO")]
    pub(crate) origin: String,
    /// Arrival airport (IATA code)
    #[arg(long, default_value = "LAX")]
    pub(crate) destination: String,
    #[arg(long, default_value_t = 2)]
    pub(crate) adults: usize,
    #[arg(long, default_value_t = 0)]
    pub(crate) children: usize,
    #[arg(long, default_value_t = 0)]
    pub(crate) infants: usize,
    /// Hours from now until the earliest acceptable return departure
    #[arg(long, default_value_t = 4)]
    pub(crate) return_after_hours: i64,
    /// Hours from now by which the party must be back
    #[arg(long, default_value_t = 12)]
    pub(crate) return_by_hours: i64,
    /// Minutes of slack on the return deadline (0 is a hard deadline)
    #[arg(long, default_value_t = 30)]
    pub(crate) flex: i64,
    /// Minutes ahead to search for outbound flights
    #[arg(long, default_value_t = 60)]
    pub(crate) lookahead: u32,
    /// Seed for the generated flights
    #[arg(long, default_value_t = DEFAULT_DEMO_SEED)]
    pub(crate) seed: u64,
    /// Number of recommendations to print
    #[arg(long, default_value_t = 5)]
    pub(crate) limit: usize,
    /// Print the full response as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let assembler = RecommendationAssembler::new(config.seat_policy, config.scoring.clone())?;
    let service = RecommendationService::new(
        Arc::new(DemoEmptiesSource::new(args.seed)),
        Arc::new(DemoScheduleSource::new(args.seed)),
        assembler,
    );

    let now = Utc::now();
    let request = RecommendRequest {
        request_id: format!("demo-{}", now.timestamp()),
        origin: args.origin.to_ascii_uppercase(),
        destination: args.destination.to_ascii_uppercase(),
        lookahead_minutes: args.lookahead,
        return_window: ReturnWindow {
            earliest: now + Duration::hours(args.return_after_hours),
            latest: now + Duration::hours(args.return_by_hours),
            return_flex_minutes: args.flex,
        },
        travelers: demo_party(&args),
    };

    let response = service.recommend(request)?;

    if args.json {
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Response unavailable as JSON: {err}"),
        }
        return Ok(());
    }

    render_response(&response, &args);
    Ok(())
}

fn demo_party(args: &DemoArgs) -> Vec<Traveler> {
    [
        (AgeBucket::Adult, args.adults),
        (AgeBucket::Child, args.children),
        (AgeBucket::Infant, args.infants),
    ]
    .into_iter()
    .flat_map(|(bucket, count)| std::iter::repeat(Traveler::new(bucket)).take(count))
    .collect()
}

fn render_response(response: &RecommendResponse, args: &DemoArgs) {
    println!(
        "Standby options {} -> {} (seed {})",
        args.origin.to_ascii_uppercase(),
        args.destination.to_ascii_uppercase(),
        args.seed
    );
    println!(
        "- {} seat(s) required | return buffer {} min | model {}{}",
        response.seats_required,
        response.required_return_buffer_minutes,
        response.model_version,
        if response.fallback_used { " (fallback)" } else { "" }
    );

    if response.recommendations.is_empty() {
        println!(
            "No outbound flights with enough open seats in the next {} min",
            args.lookahead
        );
        return;
    }

    for (rank, recommendation) in response.recommendations.iter().take(args.limit).enumerate() {
        let outbound = &recommendation.outbound;
        println!(
            "\n#{} {} departs {} | {} open (margin {:+})",
            rank + 1,
            outbound.flight_id,
            outbound.departure_time.format("%H:%M"),
            outbound.open_seats_now,
            recommendation.seat_margin
        );
        println!(
            "   trip score {:.3} | return success {:.0}% over {} eligible flight(s)",
            recommendation.trip_score,
            recommendation.return_success_probability() * 100.0,
            recommendation.eligible_return_count
        );
        for explanation in &recommendation.explanations {
            println!("   - {explanation}");
        }
    }

    println!("\nScored in {} ms", response.timing_ms.total);
}
