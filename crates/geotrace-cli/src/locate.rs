//! `geotrace locate`: provider wiring and lookup output.

use anyhow::Context;
use geotrace_core::{AppConfig, GeoLocation, StringSubject};
use geotrace_locate::{
    CachingGeoLocator, DelegatingGeoLocator, FreeGeoIpLocator, GeoLocator, IpInfoDbLocator,
    MaxMindLocator, ProviderSettings,
};

pub(crate) type Location = GeoLocation<StringSubject>;

/// The configured providers: the local MaxMind database when one is set, then
/// IPInfoDB when it has a key, then freegeoip.
pub(crate) fn build_providers(config: &AppConfig) -> anyhow::Result<DelegatingGeoLocator<StringSubject>> {
    let settings = ProviderSettings::from_config(config);
    let ipinfodb = IpInfoDbLocator::with_base_url(
        &settings,
        config.ipinfodb_api_key.clone(),
        &config.ipinfodb_url,
    )
    .context("configuring IPInfoDB provider")?;
    let freegeoip = FreeGeoIpLocator::with_base_url(&settings, &config.freegeoip_url)
        .context("configuring freegeoip provider")?;

    let mut candidates: Vec<Box<dyn GeoLocator<StringSubject>>> = Vec::with_capacity(3);
    if let Some(path) = &config.maxmind_db_path {
        candidates.push(Box::new(MaxMindLocator::new(path.clone())));
    }
    candidates.push(Box::new(ipinfodb));
    candidates.push(Box::new(freegeoip));
    Ok(DelegatingGeoLocator::new(candidates))
}

/// Providers behind the on-disk cache at `config.cache_path`.
pub(crate) fn build_cached_locator(
    config: &AppConfig,
) -> anyhow::Result<CachingGeoLocator<StringSubject, DelegatingGeoLocator<StringSubject>>> {
    Ok(CachingGeoLocator::with_file(
        build_providers(config)?,
        config.cache_path.clone(),
    ))
}

pub(crate) fn parse_subjects<I, T>(addresses: I) -> anyhow::Result<Vec<StringSubject>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    addresses
        .into_iter()
        .map(|a| StringSubject::new(a.as_ref()).with_context(|| format!("invalid address '{}'", a.as_ref())))
        .collect()
}

/// Locates every subject in order, logging batch progress.
pub(crate) async fn locate_batch<L>(locator: &L, subjects: &[StringSubject]) -> anyhow::Result<Vec<Location>>
where
    L: GeoLocator<StringSubject> + ?Sized,
{
    let mut progress = |done: usize, total: usize| {
        tracing::debug!(done, total, "locating");
        true
    };
    Ok(locator.locate_all(subjects, &mut progress).await?)
}

/// Looks up `addresses` through the cache (unless `use_cache` is off) and
/// persists the cache afterwards.
pub(crate) async fn locate_addresses(
    config: &AppConfig,
    subjects: &[StringSubject],
    use_cache: bool,
) -> anyhow::Result<Vec<Location>> {
    if !use_cache {
        return locate_batch(&build_providers(config)?, subjects).await;
    }

    let locator = build_cached_locator(config)?;
    let located = locate_batch(&locator, subjects).await;
    // Persist whatever was cached even when a later lookup failed.
    locator
        .dispose()
        .await
        .with_context(|| format!("saving cache to {}", config.cache_path.display()))?;
    located
}

/// One output line: subject, coordinates and place, tab separated.
pub(crate) fn format_location(location: &Location) -> String {
    if !location.has_valid_coordinates() {
        return format!("{}\tunknown", location.subject());
    }
    let mut line = format!(
        "{}\t{:.4}\t{:.4}",
        location.subject(),
        location.latitude(),
        location.longitude()
    );
    if let Some(place) = location.place_label() {
        line.push('\t');
        line.push_str(&place);
    }
    line
}

pub(crate) async fn run_locate(config: &AppConfig, addresses: &[String], no_cache: bool) -> anyhow::Result<()> {
    let subjects = parse_subjects(addresses)?;
    let located = locate_addresses(config, &subjects, !no_cache).await?;
    for location in &located {
        println!("{}", format_location(location));
    }
    Ok(())
}
