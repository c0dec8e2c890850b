use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const READ_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Debug)]
pub(crate) enum FetchError {
    Status(u16),
    Transport(String),
    Decode(String),
}

pub(crate) fn get_text(url: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(CONNECT_TIMEOUT)
        .timeout_read(READ_TIMEOUT)
        .timeout_write(READ_TIMEOUT)
        .build();

    let mut request = agent.get(url);
    for (key, value) in query {
        request = request.query(key, value);
    }

    match request.call() {
        Ok(response) => response
            .into_string()
            .map_err(|err| FetchError::Decode(err.to_string())),
        Err(ureq::Error::Status(status, _)) => Err(FetchError::Status(status)),
        Err(ureq::Error::Transport(err)) => Err(FetchError::Transport(err.to_string())),
    }
}
