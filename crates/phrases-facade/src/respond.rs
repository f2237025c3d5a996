/// Sent on every reply, preflight and errors included.
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Methods",
        "GET, POST, PATCH, DELETE, OPTIONS",
    ),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
    ("Access-Control-Allow-Private-Network", "true"),
];

/// Sink for a finished reply. Each host implements this once at its
/// boundary.
pub trait Respond {
    type Output;

    fn respond(
        self,
        status: u16,
        headers: &[(&'static str, &'static str)],
        body: Option<Vec<u8>>,
    ) -> Self::Output;
}
