use super::*;

const ALERTS: &str = r#"
    <body>
      <div id='saved' class='alert alert-success fade show'>
        Saved
        <button id='close-saved' type='button' class='btn-close'></button>
      </div>
      <div id='sticky' class='alert alert-warning alert-permanent show'>Read me</div>
    </body>
    "#;

#[test]
fn alerts_fade_then_detach() -> Result<()> {
    let mut page = Page::from_html(ALERTS)?;
    page.advance_time(4_999)?;
    page.assert_class("#saved", "show", true)?;

    page.advance_time(1)?;
    page.assert_class("#saved", "show", false)?;
    page.assert_exists("#saved")?;

    page.advance_time(150)?;
    assert!(matches!(
        page.assert_exists("#saved"),
        Err(Error::SelectorNotFound(_))
    ));
    page.assert_exists("#sticky")?;
    Ok(())
}

#[test]
fn permanent_alerts_are_never_scheduled() -> Result<()> {
    let page = Page::from_html(ALERTS)?;
    let timers = page.pending_timers();
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].action, "fade-out-alert");
    assert_eq!(timers[0].due_at, 5_000);
    Ok(())
}

#[test]
fn close_button_removes_alert_and_its_timer() -> Result<()> {
    let mut page = Page::from_html(ALERTS)?;
    page.click("#close-saved")?;
    assert_eq!(page.count("#saved")?, 0);
    assert!(page.pending_timers().is_empty());

    page.flush()?;
    page.assert_exists("#sticky")?;
    Ok(())
}

#[test]
fn dismiss_delay_applies_to_pending_alerts() -> Result<()> {
    let mut page = Page::from_html(ALERTS)?;
    page.set_alert_dismiss_ms(1_000)?;
    assert_eq!(page.pending_timers()[0].due_at, 1_000);

    page.advance_time(1_000)?;
    page.assert_class("#saved", "show", false)?;
    Ok(())
}

#[test]
fn notification_is_shown_then_removed() -> Result<()> {
    let mut page = Page::from_html("<body><main id='app'></main></body>")?;
    page.notify("Profile updated", NotificationKind::Success)?;

    page.assert_exists("#notification-container")?;
    page.assert_text(".toast-notification", "Profile updated")?;
    page.assert_class(".toast-notification", "alert-success", true)?;
    assert_eq!(
        page.attr(".toast-notification", "role")?.as_deref(),
        Some("status")
    );

    page.advance_time(2_999)?;
    assert_eq!(page.count(".toast-notification")?, 1);
    page.advance_time(1)?;
    assert_eq!(page.count(".toast-notification")?, 0);
    page.assert_exists("#notification-container")?;
    Ok(())
}

#[test]
fn notifications_reuse_existing_container() -> Result<()> {
    let html = r#"<body><div id='notification-container' class='mine'></div></body>"#;
    let mut page = Page::from_html(html)?;
    page.notify("one", NotificationKind::Info)?;
    page.notify("two", NotificationKind::parse("error"))?;

    assert_eq!(page.count("#notification-container")?, 1);
    assert_eq!(page.count("#notification-container > .toast-notification")?, 2);
    page.assert_class(".toast-notification:last-child", "alert-danger", true)?;
    Ok(())
}

#[test]
fn notification_delay_is_configurable() -> Result<()> {
    let mut page = Page::from_html("<body></body>")?;
    page.set_notification_ms(500)?;
    page.notify("quick", NotificationKind::Warning)?;
    page.advance_time(500)?;
    assert_eq!(page.count(".toast-notification")?, 0);
    Ok(())
}
