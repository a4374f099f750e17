//! Withdrawal request form.
//!
//! Validation happens server-side against the freshly fetched balance. A
//! valid request hands the user the external activation link; no balance is
//! deducted here.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use pesa_earnings::{
    load_profile, validate_withdrawal, MAX_WITHDRAWAL_KSH, MIN_BALANCE_FOR_WITHDRAWAL_KSH,
    MIN_WITHDRAWAL_KSH,
};

use crate::routes::{fmt_ksh, html_escape, wrap};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/withdraw", get(withdraw_page).post(request_withdrawal))
}

fn form_html(balance: f64, error: Option<&str>, success: Option<&str>, activation_url: &str) -> String {
    let error_html = match error {
        Some(msg) => format!(r#"<div class="notice error">{}</div>"#, html_escape(msg)),
        None => String::new(),
    };
    let success_html = match success {
        Some(msg) => format!(
            r#"<div class="notice success">{msg}
            <div style="margin-top:0.75rem"><a class="btn" href="{url}" target="_blank" rel="noopener">Complete activation &rarr;</a></div></div>"#,
            msg = html_escape(msg),
            url = html_escape(activation_url),
        ),
        None => String::new(),
    };
    format!(
        r#"{error_html}{success_html}
        <div class="card card-body" style="max-width:480px">
            <h3>Withdraw Earnings</h3>
            <div class="stat-card" style="margin:1rem 0"><div class="number">{balance}</div><div class="label">Available balance</div></div>
            <form method="POST" action="/withdraw">
                <label for="amount">Amount (KSH)</label>
                <input id="amount" name="amount" type="number" step="0.01" min="{min}" max="{max}" required>
                <button class="btn" type="submit" style="margin-top:1rem;width:100%">Request withdrawal</button>
            </form>
            <p style="color:#6b8578;font-size:0.8rem;margin-top:1rem">
                Minimum {min} KSH, maximum {max} KSH per request.
                A balance of at least {floor} KSH is required before withdrawing.
            </p>
        </div>"#,
        balance = fmt_ksh(balance),
        min = MIN_WITHDRAWAL_KSH,
        max = MAX_WITHDRAWAL_KSH,
        floor = MIN_BALANCE_FOR_WITHDRAWAL_KSH,
    )
}

async fn withdraw_page(State(state): State<Arc<AppState>>) -> Response {
    let Some(user) = state.current_user().await else {
        return Redirect::to("/login").into_response();
    };
    let notice = state.take_notice().await;

    let balance = match load_profile(state.store.as_ref(), user.id).await {
        Ok(p) => p.earnings,
        Err(err) => {
            tracing::error!(%err, "profile load failed on withdraw page");
            let body = format!(
                r#"<div class="notice error">Could not load your balance: {}</div>"#,
                html_escape(&err.to_string())
            );
            return wrap(
                "Withdraw",
                &body,
                Some(&user.name),
                notice.as_ref(),
                state.config.popup_interval_secs,
            )
            .into_response();
        }
    };

    let body = form_html(balance, None, None, &state.config.activation_url);
    wrap(
        "Withdraw",
        &body,
        Some(&user.name),
        notice.as_ref(),
        state.config.popup_interval_secs,
    )
    .into_response()
}

#[derive(Deserialize)]
struct WithdrawForm {
    amount: String,
}

async fn request_withdrawal(
    State(state): State<Arc<AppState>>,
    Form(form): Form<WithdrawForm>,
) -> Response {
    let Some(user) = state.current_user().await else {
        return Redirect::to("/login").into_response();
    };

    // Re-fetch rather than trust anything cached in the page.
    let balance = match load_profile(state.store.as_ref(), user.id).await {
        Ok(p) => p.earnings,
        Err(err) => {
            tracing::error!(%err, "profile load failed on withdrawal request");
            let body = form_html(
                0.0,
                Some(&format!("Could not check your balance: {err}")),
                None,
                &state.config.activation_url,
            );
            return wrap(
                "Withdraw",
                &body,
                Some(&user.name),
                None,
                state.config.popup_interval_secs,
            )
            .into_response();
        }
    };

    let amount = form.amount.trim().parse::<f64>().unwrap_or(f64::NAN);
    let outcome = validate_withdrawal(amount, balance);

    let body = match outcome {
        Ok(()) => {
            tracing::info!(amount, "withdrawal request accepted");
            form_html(
                balance,
                None,
                Some(&format!(
                    "Your withdrawal of {} has been received. Activate your account to complete the transfer.",
                    fmt_ksh(amount)
                )),
                &state.config.activation_url,
            )
        }
        Err(err) => form_html(
            balance,
            Some(&err.to_string()),
            None,
            &state.config.activation_url,
        ),
    };

    wrap(
        "Withdraw",
        &body,
        Some(&user.name),
        None,
        state.config.popup_interval_secs,
    )
    .into_response()
}
