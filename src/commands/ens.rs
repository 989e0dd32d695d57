use anyhow::Result;
use liqu_flow::config;
use liqu_flow::ens;

pub fn run(name: &str) -> Result<()> {
    let label = ens::sanitize_label(name);
    if label.is_empty() {
        anyhow::bail!("'{name}' has no usable characters (allowed: a-z, 0-9, -)");
    }

    let base = config::ens_base_domain(&|key: &str| std::env::var(key).ok());
    let ens_name = format!("{label}.{base}");
    println!("Label:    {label}");
    println!("ENS name: {ens_name}");
    println!("ENS app:  {}/name/{ens_name}", ens::ENS_APP_URL);
    Ok(())
}

pub fn serve(host: &str, port: u16) -> Result<()> {
    let base = config::ens_base_domain(&|key: &str| std::env::var(key).ok());
    super::runtime()?.block_on(liqu_flow::api::serve(host, port, &base))
}
