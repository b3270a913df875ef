use mailpeek::commands;
use mailpeek::config::Config;
use mailpeek::email_content::{extract_message_parts, find_attachments, find_header};
use mailpeek::gmail_api::{GmailClient, ListQuery, MailApi, MessageFormat};
use mailpeek::mime_tree::render_mime_tree;
use mailpeek::MailError;
use mockito::Matcher;

// "Hello Gmail" / "<p>Hello Gmail</p>" in base64url
const FULL_MESSAGE: &str = r#"{
    "id": "1889f107f29eeaff",
    "threadId": "1889f107f29eeaff",
    "labelIds": ["INBOX", "UNREAD"],
    "snippet": "Hello Gmail",
    "payload": {
        "partId": "",
        "mimeType": "multipart/mixed",
        "filename": "",
        "headers": [
            {"name": "From", "value": "Alice <alice@example.com>"},
            {"name": "Subject", "value": "Quarterly report"}
        ],
        "body": {"size": 0},
        "parts": [
            {
                "partId": "0",
                "mimeType": "multipart/alternative",
                "filename": "",
                "body": {"size": 0},
                "parts": [
                    {"partId": "0.0", "mimeType": "text/plain", "filename": "",
                     "body": {"size": 11, "data": "SGVsbG8gR21haWw="}},
                    {"partId": "0.1", "mimeType": "text/html", "filename": "",
                     "body": {"size": 18, "data": "PHA-SGVsbG8gR21haWw8L3A-"}}
                ]
            },
            {
                "partId": "1",
                "mimeType": "application/pdf",
                "filename": "report.pdf",
                "body": {"attachmentId": "ANGjdJ8-att", "size": 4}
            }
        ]
    }
}"#;

fn client_for(server: &mockito::ServerGuard) -> GmailClient {
    let config = Config::default().with_api_base(format!("{}/gmail/v1", server.url()));
    GmailClient::new(reqwest::Client::new(), "test_token".to_string(), &config)
}

#[tokio::test]
async fn test_list_labels_sends_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/gmail/v1/users/me/labels")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer test_token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"labels": [
                {"id": "INBOX", "name": "INBOX", "type": "system"},
                {"id": "Label_1", "name": "Receipts", "type": "user"}
            ]}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let labels = client.list_labels().await.unwrap();

    mock.assert_async().await;
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[1].name.as_deref(), Some("Receipts"));
    assert_eq!(labels[1].label_type.as_deref(), Some("user"));
}

#[tokio::test]
async fn test_list_messages_by_label() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/gmail/v1/users/me/messages")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("labelIds".into(), "INBOX".into()),
            Matcher::UrlEncoded("maxResults".into(), "10".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"messages": [
                {"id": "m1", "threadId": "t1"},
                {"id": "m2", "threadId": "t2"}
            ], "nextPageToken": "next", "resultSizeEstimate": 2}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let refs = client
        .list_messages(&ListQuery::label("INBOX").with_max_results(10))
        .await
        .unwrap();

    mock.assert_async().await;
    let ids: Vec<&str> = refs.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
}

#[tokio::test]
async fn test_list_messages_by_query_without_results() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/gmail/v1/users/me/messages")
        .match_query(Matcher::UrlEncoded("q".into(), "subject:Google".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"resultSizeEstimate": 0}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let refs = client
        .list_messages(&ListQuery::search("subject:Google"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(refs.is_empty());
}

#[tokio::test]
async fn test_get_full_message_and_walk_it() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/gmail/v1/users/me/messages/1889f107f29eeaff")
        .match_query(Matcher::UrlEncoded("format".into(), "full".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(FULL_MESSAGE)
        .create_async()
        .await;

    let client = client_for(&server);
    let message = client
        .get_message("1889f107f29eeaff", MessageFormat::Full)
        .await
        .unwrap();
    mock.assert_async().await;

    let payload = message.payload.as_ref().unwrap();
    assert_eq!(find_header(payload, "Subject"), Some("Quarterly report"));

    let bodies = extract_message_parts(payload).unwrap();
    assert_eq!(bodies.plain.as_deref(), Some("Hello Gmail"));
    assert_eq!(bodies.html.as_deref(), Some("<p>Hello Gmail</p>"));

    assert_eq!(
        render_mime_tree(payload, 0).unwrap(),
        "multipart/mixed\n  multipart/alternative\n    text/plain\n    text/html\n  application/pdf\n"
    );

    let attachments = find_attachments(payload);
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].filename, "report.pdf");
    assert_eq!(attachments[0].attachment_id, "ANGjdJ8-att");
}

#[tokio::test]
async fn test_get_attachment_decodes_unpadded_data() {
    let mut server = mockito::Server::new_async().await;
    // "%PDF" without padding
    let mock = server
        .mock("GET", "/gmail/v1/users/me/messages/m1/attachments/att-1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"size": 4, "data": "JVBERg"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let bytes = client.get_attachment("m1", "att-1").await.unwrap();

    mock.assert_async().await;
    assert_eq!(bytes, b"%PDF");
}

#[tokio::test]
async fn test_get_attachment_without_data() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/gmail/v1/users/me/messages/m1/attachments/att-1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"size": 0}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client.get_attachment("m1", "att-1").await;
    assert!(matches!(result, Err(MailError::MissingField("data"))));
}

#[tokio::test]
async fn test_ids_cannot_leave_their_path_segment() {
    let mut server = mockito::Server::new_async().await;
    let labels = server
        .mock("GET", "/gmail/v1/users/me/labels")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"labels": []}"#)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let message = client.get_message("../labels", MessageFormat::Full).await;
    assert!(matches!(message, Err(MailError::InvalidId(id)) if id == "../labels"));
    let attachment = client.get_attachment("m1", "../../labels").await;
    assert!(matches!(attachment, Err(MailError::InvalidId(_))));

    labels.assert_async().await;
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/gmail/v1/users/me/labels")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"code": 401, "message": "Invalid Credentials"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    match client.list_labels().await {
        Err(MailError::Api { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid Credentials"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_show_inbox_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/gmail/v1/users/me/messages")
        .match_query(Matcher::UrlEncoded("labelIds".into(), "INBOX".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"messages": [{"id": "1889f107f29eeaff", "threadId": "1889f107f29eeaff"}]}"#)
        .create_async()
        .await;
    let _get = server
        .mock("GET", "/gmail/v1/users/me/messages/1889f107f29eeaff")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(FULL_MESSAGE)
        .create_async()
        .await;

    let client = client_for(&server);
    let mut out = Vec::new();
    commands::show_inbox(&client, &mut out, 10).await.unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Inbox Messages:\n1889f107f29eeaff\nHello Gmail\n"
    );
}
