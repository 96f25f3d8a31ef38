use ft_field::ExecutionConfig;
use ft_harmonic::{HarmonicDirection, HarmonicPlan};
use ft_matrix::norms::relative_error;
use ft_rotation::Layout;
use ft_util::PlanResult;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;
use tracing_forest::ForestLayer;
use tracing_forest::util::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

const N: usize = 1024;

fn main() -> PlanResult<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(ForestLayer::default())
        .init();

    let plan = HarmonicPlan::<f64>::sph2fourier(N)?;
    let coeffs = Layout::Sphere.random::<f64, _>(N, &mut SmallRng::seed_from_u64(1));
    let config = ExecutionConfig::default();

    let mut data = coeffs.clone();
    plan.execute(&mut data, HarmonicDirection::Synthesis, &config);
    plan.execute(&mut data, HarmonicDirection::Analysis, &config);

    let err = relative_error(&data.values, &coeffs.values);
    info!(n = N, err, "sphere round trip");
    Ok(())
}
