use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use throughcache::cache::{BoundedCache, CacheConfig, RecencyMode};
use throughcache::item::EmployeeRecord;
use throughcache::persist::{JsonFilePersister, MemoryPersister, Persister};

type DynPersister = Arc<dyn Persister<EmployeeRecord> + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct AppConfig {
    capacity: Option<usize>,
    recency: Option<RecencyMode>,
    // JSON store file; in-memory store when unset
    store: Option<PathBuf>,
    log_level: Option<String>,
}

impl AppConfig {
    fn fill_from(&mut self, other: AppConfig) {
        if self.capacity.is_none() {
            self.capacity = other.capacity;
        }
        if self.recency.is_none() {
            self.recency = other.recency;
        }
        if self.store.is_none() {
            self.store = other.store;
        }
        if self.log_level.is_none() {
            self.log_level = other.log_level;
        }
    }

    fn cache_config(&self) -> CacheConfig {
        let defaults = CacheConfig::default();
        CacheConfig {
            capacity: self.capacity.unwrap_or(defaults.capacity),
            recency: self.recency.unwrap_or(defaults.recency),
        }
    }
}

fn find_config_paths(cli_cfg: Option<&PathBuf>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![];
    if let Some(p) = cli_cfg {
        paths.push(p.clone());
    }
    if let Ok(p) = std::env::var("THROUGHCACHE_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    if let Some(dir) = dirs_next::config_dir() {
        paths.push(dir.join("throughcache.toml"));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join("throughcache.toml"));
    }
    paths
}

fn env_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut cfg = AppConfig::default();
    if let Ok(s) = std::env::var("THROUGHCACHE_CAPACITY") {
        cfg.capacity = Some(s.trim().parse()?);
    }
    if let Ok(s) = std::env::var("THROUGHCACHE_RECENCY") {
        cfg.recency = Some(s.parse()?);
    }
    if let Ok(s) = std::env::var("THROUGHCACHE_STORE") {
        cfg.store = Some(PathBuf::from(s));
    }
    if let Ok(s) = std::env::var("THROUGHCACHE_LOG_LEVEL") {
        cfg.log_level = Some(s);
    }
    Ok(cfg)
}

/// Precedence: CLI > env > config files > defaults.
fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut cfg = AppConfig {
        capacity: cli.capacity,
        recency: cli.recency,
        store: cli.store.clone(),
        log_level: cli.log_level.clone(),
    };
    cfg.fill_from(env_config()?);
    for p in find_config_paths(cli.config.as_ref()) {
        if !p.exists() {
            continue;
        }
        let s = std::fs::read_to_string(&p)?;
        let file_cfg: AppConfig = toml::from_str(&s).map_err(|e| format!("{}: {e}", p.display()))?;
        cfg.fill_from(file_cfg);
    }
    Ok(cfg)
}

#[derive(Parser, Debug)]
#[command(name = "throughcache", version, about = "Write-through LRU cache workbench", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML). If omitted, defaults are used.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Resident item limit")]
    capacity: Option<usize>,
    #[arg(long, help = "Recency tracking: access_log|linked")]
    recency: Option<RecencyMode>,
    #[arg(long, help = "JSON file backing the store; in-memory when omitted")]
    store: Option<PathBuf>,
    #[arg(long, help = "Log level: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Replay a randomised put/get/remove workload in two phases and report fault rates")]
    Simulate {
        #[arg(long, default_value_t = 100, help = "Rounds per phase")]
        rounds: usize,
        #[arg(long, help = "Capacity for the second phase; defaults to 2.5x the first")]
        resize_to: Option<usize>,
        #[arg(long, help = "RNG seed for a reproducible run")]
        seed: Option<u64>,
        #[arg(long, help = "Print the fault rate after every round")]
        per_round: bool,
    },
    #[command(name = "show-config", about = "Print the effective configuration as TOML")]
    ShowConfig,
}

fn open_store(cfg: &AppConfig) -> Result<DynPersister, Box<dyn std::error::Error>> {
    let store: DynPersister = match &cfg.store {
        Some(path) => Arc::new(JsonFilePersister::<EmployeeRecord>::open(path)?),
        None => Arc::new(MemoryPersister::<EmployeeRecord>::new()),
    };
    Ok(store)
}

fn pick(rng: &mut StdRng, upper: usize) -> String {
    let n = if upper == 0 { 0 } else { rng.random_range(0..upper) };
    format!("name{n}")
}

fn run_phase(
    cache: &mut BoundedCache<EmployeeRecord, DynPersister>,
    rng: &mut StdRng,
    rounds: usize,
    per_round: bool,
) -> throughcache::Result<()> {
    for i in 0..rounds {
        cache.put(EmployeeRecord::new(format!("name{i}"), rng.random_range(0..200_000)))?;
        let name = pick(rng, i);
        if let Some(item) = cache.get(&name)? {
            log::info!("salary for {}={}", name, item.annual_salary);
        }
        let name = pick(rng, i);
        cache.put(EmployeeRecord::new(name, rng.random_range(0..200_000)))?;
        let name = pick(rng, i);
        cache.remove(&name)?;
        if per_round {
            println!("round {i}: fault rate percent={:.2}", cache.fault_rate_percent());
        }
    }
    Ok(())
}

fn report(label: &str, cache: &BoundedCache<EmployeeRecord, DynPersister>) {
    cache.log_summary(label);
    let s = cache.stats();
    println!(
        "{label}: capacity={} resident={} accesses={} faults={} evictions={} fault rate percent={:.2}",
        cache.capacity(),
        cache.len(),
        s.accesses,
        s.faults,
        s.evictions,
        s.fault_rate_percent()
    );
}

fn simulate(
    cfg: &AppConfig,
    rounds: usize,
    resize_to: Option<usize>,
    seed: Option<u64>,
    per_round: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let cache_cfg = cfg.cache_config();
    let mut cache = BoundedCache::with_config(&cache_cfg, open_store(cfg)?)?;
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    run_phase(&mut cache, &mut rng, rounds, per_round)?;
    report("phase 1", &cache);

    for i in 0..30 {
        let name = pick(&mut rng, i);
        cache.remove(&name)?;
    }
    cache.reset_stats();
    let next = resize_to.unwrap_or_else(|| cache_cfg.capacity.saturating_mul(5) / 2).max(1);
    cache.resize(next)?;

    run_phase(&mut cache, &mut rng, rounds, per_round)?;
    report("phase 2", &cache);
    let mru: Vec<&String> = cache.resident_keys_mru_first().take(10).collect();
    println!("most recently used: {mru:?}");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    if std::env::var("THROUGHCACHE_LOG_DIR").is_ok() {
        throughcache::logger::configure_from_env()?;
    } else {
        throughcache::logger::configure_console(cfg.log_level.as_deref().unwrap_or("warn"))?;
    }

    match cli.command {
        Commands::Simulate { rounds, resize_to, seed, per_round } => {
            simulate(&cfg, rounds, resize_to, seed, per_round)?;
        }
        Commands::ShowConfig => {
            let cache_cfg = cfg.cache_config();
            cache_cfg.validate()?;
            let effective = AppConfig {
                capacity: Some(cache_cfg.capacity),
                recency: Some(cache_cfg.recency),
                ..cfg
            };
            print!("{}", toml::to_string(&effective)?);
        }
    }
    Ok(())
}
