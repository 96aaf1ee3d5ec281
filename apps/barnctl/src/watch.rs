//! Headless watcher: log in, subscribe, log every event.

use barn_client::hooks::ListenerId;
use barn_client::{BarnClient, Credentials};

use std::future::Future;

use log::{error, info, warn};
use tokio::runtime::Handle;

/// Wire the watcher behaviour onto `client`.
///
/// On connect the configured credentials are used to log in (or, without
/// credentials, the buckets are subscribed straight away). After a successful
/// login every configured bucket not yet subscribed is registered. All
/// inbound events are logged.
pub fn install(client: &BarnClient) -> Vec<ListenerId> {
    let mut listeners = Vec::new();

    let on_connect = client.clone();
    listeners.push(client.on_connect(move |_| {
        let client = on_connect.clone();
        let credentials = client.config().credentials.clone();

        match credentials {
            Some(Credentials {
                username,
                password: Some(password),
            }) => spawn_operation("login", async move {
                let _ = client.login(&username, password).await;
            }),
            Some(Credentials {
                username,
                password: None,
            }) => warn!("No password for {username}, set it in the config file or BARN_PASSWORD"),
            None => spawn_operation("subscribe", async move {
                subscribe_watch_buckets(&client).await;
            }),
        }
    }));

    let on_login = client.clone();
    listeners.push(client.on_login(move |outcome| {
        if !outcome.success {
            warn!(
                "Login refused: {}",
                outcome.error.as_deref().unwrap_or("no reason given")
            );
            return;
        }

        info!("Logged in with rights {}", outcome.rights);
        let client = on_login.clone();
        spawn_operation("subscribe", async move {
            subscribe_watch_buckets(&client).await;
        });
    }));

    listeners.push(client.on_disconnect(|_| warn!("Disconnected from server")));
    listeners.push(client.on_error(|e| error!("{e}")));
    listeners.push(client.on_logout(|_| info!("Logged out")));
    listeners.push(client.on_message(|message| info!("Server message: {message}")));
    listeners.push(client.on_read(|result| {
        info!("{} record(s) from {}", result.items.len(), result.bucket_name)
    }));
    listeners.push(client.on_insert(|envelope| info!("INSERT {envelope}")));
    listeners.push(client.on_update(|envelope| info!("UPDATE {envelope}")));
    listeners.push(client.on_delete(|envelope| info!("DELETE {envelope}")));
    listeners.push(client.on_register_event(|ack| match &ack.error {
        Some(reason) => warn!("Watching {} ({reason})", ack.bucket_name),
        None => info!("Watching {}", ack.bucket_name),
    }));

    listeners
}

/// Register every configured bucket that is not already subscribed.
pub async fn subscribe_watch_buckets(client: &BarnClient) {
    for bucket_name in &client.config().watch_buckets {
        if client.is_subscribed(bucket_name) {
            continue;
        }
        // Errors already went to the error hooks.
        let _ = client.register_event(bucket_name).await;
    }
}

fn spawn_operation<F>(name: &str, operation: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(operation);
        }
        Err(_) => error!("Cannot run {name} outside the async runtime"),
    }
}
