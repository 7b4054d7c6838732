//! Submission flow: validation, multipart upload, and state reset.

mod common;

use common::{job_json, sign_in, test_client};
use mockito::Matcher;
use morphbox_client::{Error, Submission, ValidationError};

#[tokio::test]
async fn submit_uploads_multipart_and_returns_the_job() {
    let mut server = mockito::Server::new_async().await;
    let (dir, client) = test_client(&server);
    sign_in(&client);

    // 2 MB input file
    let file = dir.path().join("song.mp3");
    std::fs::write(&file, vec![0xAB; 2 * 1024 * 1024]).unwrap();

    let m = server
        .mock("POST", "/conversions/upload/")
        .match_header(
            "content-type",
            Matcher::Regex("multipart/form-data.*".into()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file""#.into()),
            Matcher::Regex(r#"filename="song.mp3""#.into()),
            Matcher::Regex(r#"name="inputFormat""#.into()),
            Matcher::Regex(r#"name="outputFormat""#.into()),
        ]))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            job_json("3e2f1a34-1111-2222-3333-444455556666", "pending", 0).to_string(),
        )
        .create_async()
        .await;

    let mut submission = Submission::from_file(&file);
    assert_eq!(submission.input_format, "mp3");
    submission.output_format = "wav".into();

    let job = client.submit.submit(&mut submission).await.unwrap();
    m.assert_async().await;

    assert_eq!(
        job.id.to_string(),
        "3e2f1a34-1111-2222-3333-444455556666"
    );
    assert_eq!(job.status, morphbox_types::JobStatus::Pending);
    assert_eq!(job.input_format, "mp3");
    assert_eq!(job.output_format, "wav");

    // transient selection is reset on success
    assert!(submission.file.is_none());
    assert!(submission.input_format.is_empty());
    assert!(submission.output_format.is_empty());
}

#[tokio::test]
async fn validation_failures_never_reach_the_wire() {
    let mut server = mockito::Server::new_async().await;
    let (_dir, client) = test_client(&server);
    sign_in(&client);

    let m = server
        .mock("POST", "/conversions/upload/")
        .expect(0)
        .create_async()
        .await;

    let mut no_file = Submission::default();
    let err = client.submit.submit(&mut no_file).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingFile)
    ));

    let mut no_output = Submission {
        file: Some("/tmp/x.mp3".into()),
        input_format: "mp3".into(),
        output_format: String::new(),
    };
    let err = client.submit.submit(&mut no_output).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingOutputFormat)
    ));

    m.assert_async().await;
}

#[tokio::test]
async fn unreadable_file_is_a_validation_failure() {
    let mut server = mockito::Server::new_async().await;
    let (dir, client) = test_client(&server);
    sign_in(&client);

    let m = server
        .mock("POST", "/conversions/upload/")
        .expect(0)
        .create_async()
        .await;

    let mut submission = Submission::from_file(dir.path().join("does-not-exist.mp3"));
    submission.output_format = "wav".into();
    let err = client.submit.submit(&mut submission).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::FileUnreadable { .. })
    ));
    // selection survives a failed submit so the user can correct it
    assert!(submission.file.is_some());
    m.assert_async().await;
}

#[tokio::test]
async fn server_rejection_surfaces_its_message_and_keeps_selection() {
    let mut server = mockito::Server::new_async().await;
    let (dir, client) = test_client(&server);
    sign_in(&client);

    let file = dir.path().join("big.mkv");
    std::fs::write(&file, b"fake video").unwrap();

    let _m = server
        .mock("POST", "/conversions/upload/")
        .with_status(413)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Storage quota exceeded"}"#)
        .create_async()
        .await;

    let mut submission = Submission::from_file(&file);
    submission.output_format = "mp4".into();
    let err = client.submit.submit(&mut submission).await.unwrap_err();
    assert!(err.to_string().contains("Storage quota exceeded"));
    assert!(submission.file.is_some());
}
