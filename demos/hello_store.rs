use gosub_store::storage::DisabledArea;
use gosub_store::{BackendRegistry, Host, StoreConfig, StoreError, StoreFactory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
struct Profile {
    name: String,
    visits: u32,
}

fn main() -> Result<(), StoreError> {
    env_logger::init();

    // A host like a regular browser: durable and session storage both work.
    let mut factory = StoreFactory::new(Host::in_memory(), BackendRegistry::with_defaults(), StoreConfig::default())?;

    factory.store_mut().set("greeting", &"hello")?;
    println!("greeting = {:?}", factory.store_mut().get::<String>("greeting")?);

    let mut profiles = factory.create_namespaced_store("profiles", None, None)?;
    profiles.set("alice", &Profile { name: "Alice".into(), visits: 1 })?;
    println!("stored at {} -> {:?}", profiles.get_namespaced_key("alice"), profiles.get::<Profile>("alice")?);

    let mut tab = factory.create_namespaced_store("tab", Some("sessionStorage"), Some(":"))?;
    tab.set("scroll", &420)?;
    println!("session value {} = {:?}", tab.get_namespaced_key("scroll"), tab.get_value("scroll"));

    // A locked-down host: storage refuses writes, everything ends up in cookies.
    let locked = Host::builder()
        .durable(Arc::new(DisabledArea))
        .without_session()
        .build();
    let mut factory = StoreFactory::new(locked, BackendRegistry::with_defaults(), StoreConfig::default())?;
    factory.store_mut().set("greeting", &"hello from a cookie")?;

    for (name, value) in factory.host().cookie_jar().read().map(|jar| jar.get_all()).unwrap_or_default() {
        println!("cookie: {name}={value}");
    }

    // Persistent host: values survive the process.
    #[cfg(feature = "sqlite")]
    {
        let dir = std::env::temp_dir().join("gosub-store-demo");
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Backend(e.into()))?;

        let host = Host::persistent(dir.join("storage.db"), dir.join("cookies.json"))?;
        let mut factory = StoreFactory::new(host, BackendRegistry::with_defaults(), StoreConfig::default())?;

        let runs = factory.store_mut().get::<u32>("runs")?.unwrap_or(0) + 1;
        factory.store_mut().set("runs", &runs)?;
        println!("this demo ran {runs} time(s) against {}", dir.display());
    }

    Ok(())
}
