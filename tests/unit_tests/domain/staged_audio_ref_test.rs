use halo_whisper::domain::{InvalidAudioUrl, StagedAudioRef};

#[test]
fn given_https_url_when_caller_provides_it_then_reference_is_built() {
    let staged = StagedAudioRef::caller_provided(" https://cdn.example/clips/a.webm ").unwrap();

    assert_eq!(staged.url(), "https://cdn.example/clips/a.webm");
    assert!(!staged.is_one_time_use());
}

#[test]
fn given_empty_url_when_caller_provides_it_then_rejected() {
    assert_eq!(
        StagedAudioRef::caller_provided("   "),
        Err(InvalidAudioUrl::Empty)
    );
}

#[test]
fn given_relative_url_when_caller_provides_it_then_rejected() {
    assert_eq!(
        StagedAudioRef::caller_provided("/clips/a.webm"),
        Err(InvalidAudioUrl::NotAbsolute)
    );
}

#[test]
fn given_ftp_url_when_caller_provides_it_then_scheme_rejected() {
    assert_eq!(
        StagedAudioRef::caller_provided("ftp://files.example/a.webm"),
        Err(InvalidAudioUrl::UnsupportedScheme("ftp".to_string()))
    );
}

#[test]
fn given_url_without_host_when_caller_provides_it_then_rejected() {
    assert_eq!(
        StagedAudioRef::caller_provided("https://"),
        Err(InvalidAudioUrl::MissingHost)
    );
}

#[test]
fn given_malformed_urls_when_caller_provides_them_then_all_rejected() {
    let malformed = [
        "http://exa mple.com/a.webm",
        "https://host:notaport/x",
        "http://[::1/x",
        "https://a\nb/c",
        "https://cdn.example/a\tb.webm",
    ];

    for url in malformed {
        assert!(
            matches!(
                StagedAudioRef::caller_provided(url),
                Err(InvalidAudioUrl::Malformed(_))
            ),
            "{:?} should be rejected",
            url
        );
    }
}

#[test]
fn given_mailto_url_when_caller_provides_it_then_scheme_rejected() {
    assert_eq!(
        StagedAudioRef::caller_provided("mailto:someone@example.com"),
        Err(InvalidAudioUrl::UnsupportedScheme("mailto".to_string()))
    );
}

#[test]
fn given_capability_url_when_redacted_then_only_host_remains() {
    let staged = StagedAudioRef::new("https://file.io/Xk9secret?download=1");

    assert_eq!(staged.redacted(), "https://file.io/…");
}

#[test]
fn given_staged_reference_when_taking_receipt_then_receipt_keeps_url_and_hides_it_in_debug() {
    let staged = StagedAudioRef::new("https://stage.example/abc123");

    let receipt = staged.receipt();

    assert_eq!(receipt.url(), "https://stage.example/abc123");
    assert!(!format!("{:?}", receipt).contains("abc123"));
}

#[test]
fn given_capability_url_when_debug_formatted_then_path_is_hidden() {
    let staged = StagedAudioRef::new("https://stage.example/abc123").one_time_use();

    let debug = format!("{:?}", staged);

    assert!(!debug.contains("abc123"));
    assert!(debug.contains("one_time_use: true"));
}
