use server_config::{Loader, ServerConfig};

fn main() -> Result<(), server_config::ConfigError> {
    // DBPASS is not in the file; set it in the environment before running.
    let config: ServerConfig = Loader::new("demos/server.yaml").load()?;

    println!("Database: {}", config.database.connect_string);
    println!(
        "Syslog: enabled={} priority={}",
        config.logging.syslog_enabled,
        config.logging.syslog.priority()
    );
    println!(
        "Redis: {} (max_idle={}, idle_timeout={:?})",
        config.redis.server, config.redis.max_idle, config.redis.idle_timeout
    );
    println!("HTTP: listening on {}", config.http.bind_addr);

    Ok(())
}
