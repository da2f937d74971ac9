// School Report
//
// Purpose: Print the dashboard numbers (overview, districts, top schools) as
// JSON through whichever backend the environment selects.
// Usage:
//   cargo run --features api --bin school_report                 # bundled data
//   SCHOOLS_API_URL=http://127.0.0.1:5000 cargo run --features api --bin school_report

use school_stats::{
    Backend, HttpTransport, InMemorySchools, RemoteSchools, SchoolQueries, SchoolQuery,
    ServiceConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn report<Q: SchoolQueries>(schools: &Q, name_filter: Option<String>) -> anyhow::Result<()> {
    let overview = schools.overview_stats().await?;
    let districts = schools.districts().await?;
    let top = schools.top_schools(None).await?;

    let mut query = SchoolQuery::default();
    query.filter.name_contains = name_filter;
    let listing = schools.list_schools(query).await?;

    let report = serde_json::json!({
        "overview": overview,
        "districts": districts,
        "top_schools": top,
        "schools": listing,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "school_stats=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ServiceConfig::from_env();
    let name_filter = std::env::args().nth(1);

    match config.backend() {
        Backend::Static => {
            tracing::info!("Using in-memory backend");
            let schools = InMemorySchools::new(config.load_repository()?);
            report(&schools, name_filter).await
        }
        Backend::Remote(url) => {
            tracing::info!("Using remote backend at {}", url);
            let schools = RemoteSchools::new(HttpTransport::new(url));
            report(&schools, name_filter).await
        }
    }
}
