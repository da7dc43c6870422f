use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitstreak::config::Config;
use fitstreak::handlers::{exercises, sessions, stats, workouts};
use fitstreak::repositories::{
    ExerciseRepository, SessionRepository, StatsRepository, WorkoutRepository,
};
use fitstreak::{db, migrations, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitstreak=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database: {}", config.database_url);

    let pool = db::create_pool(&config.database_url)?;

    migrations::run_migrations(&pool)?;

    // Create repositories
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());
    let session_repo = SessionRepository::new(pool.clone());
    let stats_repo = StatsRepository::new(pool.clone());

    // Abandoned sessions are reported, not force-closed.
    let cutoff = chrono::Utc::now() - chrono::Duration::hours(config.stale_session_hours);
    let stale = session_repo.count_stale_open(cutoff).await?;
    if stale > 0 {
        tracing::warn!(
            count = stale,
            hours = config.stale_session_hours,
            "Sessions still open past the stale threshold"
        );
    }

    // Create handler states
    let sessions_state = sessions::SessionsState {
        session_repo: session_repo.clone(),
        day_boundary: config.day_boundary,
    };
    let stats_state = stats::StatsState {
        stats_repo: stats_repo.clone(),
    };
    let workouts_state = workouts::WorkoutsState {
        workout_repo: workout_repo.clone(),
    };
    let exercises_state = exercises::ExercisesState {
        exercise_repo: exercise_repo.clone(),
    };

    let app = routes::create_router(sessions_state, stats_state, workouts_state, exercises_state);

    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
