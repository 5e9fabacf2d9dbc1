use moon::*;

async fn frontend() -> Frontend {
    Frontend::new()
        .title("minipen")
        .append_to_head(r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#)
}

async fn up_msg_handler(_: UpMsgRequest<()>) {}

#[moon::main]
async fn main() -> std::io::Result<()> {
    start(frontend, up_msg_handler, |_| {}).await
}
