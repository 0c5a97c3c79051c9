//! Customer side kiosk sessions.
//!
//! A [`KioskSession`] is the state container for one walk-up customer: the
//! current screen, the cart, the checkout draft, the submission latch and the
//! tracker of the last placed order. Sessions live in a [`KioskRegistry`]
//! keyed by an id stored in the browser cookie.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem, CartTarget};
use crate::domain::flow::{FlowError, FlowGuards, KioskAction, KioskView, transition};
use crate::domain::money::Money;
use crate::domain::order::{Order, OrderNumber};
use crate::domain::session::{DiningMode, OrderSession, UserDetails};
use crate::domain::settings::AppSettings;
use crate::domain::tracker::{TrackerState, TrackerStep};
use crate::forms::checkout::{AddToCartForm, UserDetailsForm};
use crate::realtime::synchronizer::StatusSynchronizer;
use crate::realtime::{OrderChange, OrderFeed};
use crate::repository::{OrderReader, OrderWriter};
use crate::services::{ServiceError, ServiceResult};
use crate::webhook::{OrderNotifier, WebhookPayload};

/// How many order numbers are drawn before accepting a clash.
const MAX_ORDER_NUMBER_DRAWS: usize = 5;

const PENDING_SYNC_NOTICE: &str =
    "We could not reach the kitchen. Please show this order number at the counter.";

/// Result of placing an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// The store accepted the order.
    Confirmed {
        order_id: i32,
        order_number: OrderNumber,
    },
    /// The order only exists on this kiosk.
    PendingSync {
        order_number: OrderNumber,
        reason: String,
    },
}

impl SubmissionOutcome {
    pub fn order_number(&self) -> OrderNumber {
        match self {
            SubmissionOutcome::Confirmed { order_number, .. }
            | SubmissionOutcome::PendingSync { order_number, .. } => *order_number,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubmissionOutcome::Confirmed { .. })
    }
}

/// Tracker state together with the steps to render.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerView {
    #[serde(flatten)]
    pub state: TrackerState,
    pub steps: Vec<TrackerStep>,
}

/// Everything a client needs to render the current screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskSnapshot {
    #[serde(flatten)]
    pub view: KioskView,
    pub cart: Vec<CartItem>,
    pub cart_total: Money,
    pub cart_count: u32,
    pub details: UserDetails,
    pub change_due: Option<Money>,
    pub can_continue: bool,
    pub is_submitting: bool,
    pub tracker: Option<TrackerView>,
    pub last_order: Option<SubmissionOutcome>,
    /// Notices queued since the previous snapshot.
    pub toasts: Vec<String>,
}

/// State container for one customer.
#[derive(Debug, Default)]
pub struct KioskSession {
    view: KioskView,
    cart: Cart,
    order: OrderSession,
    is_submitting: bool,
    tracker: Option<StatusSynchronizer>,
    last_order: Option<SubmissionOutcome>,
    toasts: VecDeque<String>,
}

impl KioskSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &KioskView {
        &self.view
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn order_session(&self) -> &OrderSession {
        &self.order
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn tracker(&self) -> Option<&StatusSynchronizer> {
        self.tracker.as_ref()
    }

    pub fn last_order(&self) -> Option<&SubmissionOutcome> {
        self.last_order.as_ref()
    }

    fn guards(&self) -> FlowGuards {
        FlowGuards {
            cart_count: self.cart.count(),
            missing_details: self.order.details().missing_fields(),
            is_submitting: self.is_submitting,
        }
    }

    fn advance(&mut self, action: &KioskAction) -> Result<(), FlowError> {
        let next = transition(&self.view, action, &self.guards())?;
        log::debug!(
            "Kiosk view {} -> {} via {}",
            self.view.name(),
            next.name(),
            action.name()
        );
        self.view = next;
        Ok(())
    }

    fn push_toast(&mut self, message: impl Into<String>) {
        self.toasts.push_back(message.into());
    }

    /// Apply a navigation action sent by the client.
    ///
    /// Actions with side effects of their own (adding to the cart, picking a
    /// dining mode, placing the order) have dedicated operations and are
    /// rejected here.
    pub fn navigate(
        &mut self,
        settings: &AppSettings,
        action: KioskAction,
    ) -> Result<&KioskView, FlowError> {
        match &action {
            KioskAction::AddedToCart | KioskAction::ModeSelected | KioskAction::OrderPlaced => {
                return Err(FlowError::IllegalTransition {
                    from: self.view.name(),
                    action: action.name(),
                });
            }
            KioskAction::OpenProduct { product_id } => {
                let product = settings
                    .product(product_id)
                    .ok_or_else(|| FlowError::UnknownProduct(product_id.clone()))?;
                if !product.is_available {
                    return Err(FlowError::ProductUnavailable(product_id.clone()));
                }
            }
            _ => {}
        }

        self.advance(&action)?;

        if action == KioskAction::Restart {
            self.restart();
        }

        Ok(&self.view)
    }

    /// Add the selection on the product detail screen and return to the menu.
    /// Returns the index of the affected cart line.
    pub fn add_to_cart(
        &mut self,
        settings: &AppSettings,
        form: AddToCartForm,
        today: NaiveDate,
    ) -> Result<usize, FlowError> {
        let next = transition(&self.view, &KioskAction::AddedToCart, &self.guards())?;

        if settings.is_holiday(today) {
            return Err(FlowError::Closed);
        }

        let product = settings
            .product(&form.product_id)
            .ok_or_else(|| FlowError::UnknownProduct(form.product_id.clone()))?;
        if !product.is_available {
            return Err(FlowError::ProductUnavailable(product.id.clone()));
        }

        let size = product
            .resolve_size(form.size.as_deref())
            .ok_or_else(|| FlowError::UnknownSize {
                product_id: product.id.clone(),
                size: form.size.clone().unwrap_or_default(),
            })?;
        let addons = product
            .resolve_addons(form.addons.iter().map(String::as_str))
            .map_err(|addon| FlowError::UnknownAddon {
                product_id: product.id.clone(),
                addon,
            })?;

        let index = self
            .cart
            .add(product, form.quantity, size, addons)
            .ok_or(FlowError::EmptyCart)?;

        let name = product.name.clone();
        self.view = next;
        self.push_toast(format!("Added {name}"));
        Ok(index)
    }

    /// Adjust cart quantities. Unknown targets are ignored.
    pub fn update_quantity(&mut self, target: &CartTarget, delta: i64) {
        self.cart.update_quantity(target, delta);
    }

    /// Pick the dining mode on the checkout screen.
    pub fn select_dining_mode(&mut self, mode: DiningMode) -> Result<&KioskView, FlowError> {
        self.advance(&KioskAction::ModeSelected)?;
        self.order.select_dining_mode(mode);
        Ok(&self.view)
    }

    /// Store the contact details and move to the final summary when they are
    /// complete. Incomplete details are kept so the customer can keep typing.
    pub fn submit_details(&mut self, details: UserDetails) -> Result<&KioskView, FlowError> {
        if self.view != KioskView::UserDetails {
            return Err(FlowError::IllegalTransition {
                from: self.view.name(),
                action: KioskAction::ConfirmDetails.name(),
            });
        }

        self.order.set_details(details);
        self.advance(&KioskAction::ConfirmDetails)?;
        Ok(&self.view)
    }

    pub fn change_due(&self) -> Option<Money> {
        self.order.change_due(self.cart.total())
    }

    /// Engage the submission latch. Only one submission may be in flight.
    fn begin_submission(&mut self) -> Result<(), FlowError> {
        if self.is_submitting {
            return Err(FlowError::SubmissionInFlight);
        }
        if self.view != KioskView::FinalSummary {
            return Err(FlowError::IllegalTransition {
                from: self.view.name(),
                action: KioskAction::OrderPlaced.name(),
            });
        }
        if self.cart.is_empty() {
            return Err(FlowError::EmptyCart);
        }
        let missing = self.order.details().missing_fields();
        if !missing.is_empty() {
            return Err(FlowError::InvalidDetails(missing));
        }

        self.is_submitting = true;
        Ok(())
    }

    /// Release the latch and show the confirmation screen.
    fn complete_submission(
        &mut self,
        outcome: SubmissionOutcome,
        tracker: StatusSynchronizer,
    ) -> Result<(), FlowError> {
        self.is_submitting = false;
        self.advance(&KioskAction::OrderPlaced)?;

        if let SubmissionOutcome::PendingSync { .. } = outcome {
            self.push_toast(PENDING_SYNC_NOTICE);
        }
        self.tracker = Some(tracker);
        self.last_order = Some(outcome);
        Ok(())
    }

    /// Clear the cart, the checkout draft and the tracker.
    fn restart(&mut self) {
        self.cart.clear();
        self.order.reset();
        self.is_submitting = false;
        // Dropping the synchronizer releases its feed subscription.
        self.tracker = None;
        self.last_order = None;
        self.toasts.clear();
    }

    /// Render the current state and drain pending notices.
    pub fn snapshot(&mut self) -> KioskSnapshot {
        if let Some(tracker) = &self.tracker {
            let notices = tracker.take_notifications();
            self.toasts.extend(notices);
        }

        let tracker = self.tracker.as_ref().map(|sync| {
            let state = sync.snapshot();
            let steps = state.steps();
            TrackerView { state, steps }
        });

        KioskSnapshot {
            view: self.view.clone(),
            cart: self.cart.items().to_vec(),
            cart_total: self.cart.total(),
            cart_count: self.cart.count(),
            details: self.order.details().clone(),
            change_due: self.change_due(),
            can_continue: self.order.can_continue(),
            is_submitting: self.is_submitting,
            tracker,
            last_order: self.last_order.clone(),
            toasts: self.toasts.drain(..).collect(),
        }
    }
}

/// Apply a details form to the session.
pub fn submit_details(
    kiosk: &mut KioskSession,
    form: UserDetailsForm,
) -> ServiceResult<KioskView> {
    let details = form
        .into_details()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let view = kiosk.submit_details(details)?;
    Ok(view.clone())
}

/// Draw a display number that no active order currently shows.
fn draw_order_number<R>(repo: &R) -> OrderNumber
where
    R: OrderReader + ?Sized,
{
    let mut number = OrderNumber::random();
    for _ in 1..MAX_ORDER_NUMBER_DRAWS {
        match repo.order_number_in_use(number) {
            Ok(false) => return number,
            Ok(true) => number = OrderNumber::random(),
            Err(err) => {
                log::warn!("Failed to check order number {}: {err}", number.value());
                return number;
            }
        }
    }
    number
}

/// Submit the checkout of `kiosk` and move it to the confirmation screen.
///
/// Store failures do not fail the call: the kiosk still advances and the
/// outcome reports `PendingSync` with the locally drawn number.
pub fn place_order<R, N>(
    repo: &R,
    feed: &OrderFeed,
    notifier: &N,
    settings: &AppSettings,
    kiosk: &mut KioskSession,
) -> ServiceResult<SubmissionOutcome>
where
    R: OrderReader + OrderWriter + ?Sized,
    N: OrderNotifier + ?Sized,
{
    kiosk.begin_submission()?;

    let order_number = draw_order_number(repo);
    let dining_mode = kiosk.order.dining_mode();
    let payload = kiosk.order.to_order_payload(&kiosk.cart, order_number);

    let (outcome, tracker, created) = match repo.create_order(&payload) {
        Ok(order) => {
            log::info!(
                "Order #{} stored with id {}",
                order.order_number.value(),
                order.id
            );
            // Subscribe before publishing so no update can slip past.
            let tracker = StatusSynchronizer::subscribe(
                feed,
                order.id,
                order.order_number,
                dining_mode,
                order.status,
            );
            feed.publish(&OrderChange::Inserted(order.clone()));
            let outcome = SubmissionOutcome::Confirmed {
                order_id: order.id,
                order_number: order.order_number,
            };
            (outcome, tracker, Some(order))
        }
        Err(err) => {
            log::error!(
                "Failed to store order #{}: {err}",
                order_number.value()
            );
            let outcome = SubmissionOutcome::PendingSync {
                order_number,
                reason: err.to_string(),
            };
            (
                outcome,
                StatusSynchronizer::local(order_number, dining_mode),
                None,
            )
        }
    };

    if let Some(order) = created {
        notify_kitchen(notifier, settings, &order);
    }

    kiosk.complete_submission(outcome.clone(), tracker)?;
    Ok(outcome)
}

fn notify_kitchen<N>(notifier: &N, settings: &AppSettings, order: &Order)
where
    N: OrderNotifier + ?Sized,
{
    if let Some(url) = settings.webhook_url() {
        notifier.notify(url, WebhookPayload::from_order(order, &settings.currency));
    }
}

/// Shared handle to one kiosk session.
pub type SharedKiosk = Arc<Mutex<KioskSession>>;

/// Minutes a session may sit untouched before it is evicted.
pub const DEFAULT_IDLE_MINUTES: i64 = 30;

struct RegistryEntry {
    kiosk: SharedKiosk,
    last_seen: NaiveDateTime,
}

/// In-memory table of live kiosk sessions.
///
/// Every `open` refreshes the caller's entry and evicts sessions idle for
/// longer than the configured TTL. Dropping an evicted session releases its
/// tracker subscription.
pub struct KioskRegistry {
    sessions: Mutex<HashMap<String, RegistryEntry>>,
    idle_ttl: TimeDelta,
}

impl Default for KioskRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(TimeDelta::minutes(DEFAULT_IDLE_MINUTES))
    }
}

impl KioskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: TimeDelta) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Return the session for `id`, creating a fresh one when the id is
    /// missing, unknown or expired.
    pub fn open(&self, id: Option<&str>) -> (String, SharedKiosk) {
        self.open_at(id, Local::now().naive_utc())
    }

    pub fn open_at(&self, id: Option<&str>, now: NaiveDateTime) -> (String, SharedKiosk) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let evicted = Self::take_idle(&mut sessions, now, self.idle_ttl);

        let existing = id.and_then(|id| {
            let entry = sessions.get_mut(id)?;
            entry.last_seen = now;
            Some((id.to_string(), Arc::clone(&entry.kiosk)))
        });

        let opened = match existing {
            Some(opened) => opened,
            None => {
                let id = Uuid::new_v4().to_string();
                let kiosk = Arc::new(Mutex::new(KioskSession::new()));
                sessions.insert(
                    id.clone(),
                    RegistryEntry {
                        kiosk: Arc::clone(&kiosk),
                        last_seen: now,
                    },
                );
                log::debug!("Opened kiosk session {id}");
                (id, kiosk)
            }
        };

        drop(sessions);
        drop(evicted);
        opened
    }

    /// Drop sessions idle for longer than the TTL. Returns how many were
    /// removed.
    pub fn evict_idle(&self, now: NaiveDateTime) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let evicted = Self::take_idle(&mut sessions, now, self.idle_ttl);
        drop(sessions);
        evicted.len()
    }

    fn take_idle(
        sessions: &mut HashMap<String, RegistryEntry>,
        now: NaiveDateTime,
        idle_ttl: TimeDelta,
    ) -> Vec<RegistryEntry> {
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, entry)| now - entry.last_seen > idle_ttl)
            .map(|(id, _)| id.clone())
            .collect();

        if !expired.is_empty() {
            log::debug!("Evicting {} idle kiosk sessions", expired.len());
        }
        expired
            .iter()
            .filter_map(|id| sessions.remove(id))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<SharedKiosk> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|entry| Arc::clone(&entry.kiosk))
    }

    /// Forget the session. Its tracker subscription is released once the
    /// last handle is gone.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        removed.is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
