use crate::envelope::Reply;

/// `GET /healthz`: the process is up. Says nothing about the database.
pub async fn healthz() -> Reply<()> {
    Reply::message("ok")
}
