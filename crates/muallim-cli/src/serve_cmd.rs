use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use muallim_core::controller::{Controller, GENERATION_FAILED_MESSAGE, SubmitError};
use muallim_core::form::{FormError, Level, LessonForm, Period, Week};
use muallim_core::ingest::Ingestor;
use muallim_core::plan::lesson_plan_schema;
use muallim_core::render::{RenderOptions, escape_html, render_plan_html};

type AppState = Arc<Controller>;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
    kind: Option<&'static str>,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
            kind: None,
        }
    }

    pub fn bad_request(err: FormError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: err.to_string(),
            kind: Some("form"),
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Busy => Self {
                status: StatusCode::CONFLICT,
                message: "a generation is already in progress".to_string(),
                kind: Some("busy"),
            },
            SubmitError::Form(e) => Self::bad_request(e),
            SubmitError::Plan(e) => Self {
                status: StatusCode::BAD_GATEWAY,
                message: GENERATION_FAILED_MESSAGE.to_string(),
                kind: Some(e.kind()),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self.kind {
            Some(kind) => serde_json::json!({ "error": self.message, "kind": kind }),
            None => serde_json::json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub level: String,
    pub period: String,
    pub week: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub files: Vec<UploadBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBody {
    pub name: String,
    pub data_url: String,
}

impl GenerateBody {
    fn form(&self) -> Result<LessonForm, FormError> {
        Ok(LessonForm {
            level: self.level.parse::<Level>()?,
            period: self.period.parse::<Period>()?,
            week: self.week.parse::<Week>()?,
            subject: self.subject.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(controller: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/new", get(new_lesson))
        .route("/card", get(card))
        .route("/api/generate", post(generate))
        .route("/api/plan", get(current_plan))
        .route("/api/reset", post(reset))
        .route("/api/schema", get(schema))
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .with_state(controller)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(controller: Controller, bind: &str, port: u16) -> Result<()> {
    let app = build_router(Arc::new(controller));
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("muallim serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("muallim serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
    }
}

// ---------------------------------------------------------------------------
// Form page
// ---------------------------------------------------------------------------

const FORM_STYLE: &str = r#"
body{margin:0;min-height:100vh;display:flex;flex-direction:column;align-items:center;justify-content:center;
  font-family:"Segoe UI",system-ui,sans-serif;background:#fffbeb;padding:1rem}
.brand{text-align:center;margin-bottom:2rem}
.brand h1{margin:.5rem 0;font-size:2.5rem;color:#0f766e}
.brand p{margin:0;color:#4b5563}
form{width:100%;max-width:28rem;background:#fff;padding:2rem;border-radius:1rem;border-top:8px solid #eab308;
  box-shadow:0 25px 50px -12px rgba(0,0,0,.25);display:flex;flex-direction:column;gap:1.25rem}
label{display:block;font-size:.875rem;font-weight:500;color:#374151;margin-bottom:.25rem}
select,input[type=text]{width:100%;padding:.75rem;border:1px solid #d1d5db;border-radius:.5rem;font:inherit}
.row{display:grid;grid-template-columns:1fr 1fr;gap:1rem}
.drop{border:2px dashed #d1d5db;border-radius:.75rem;padding:1.5rem;text-align:center;color:#4b5563}
button{padding:1rem;border:0;border-radius:.75rem;font:700 1rem inherit;color:#fff;
  background:linear-gradient(90deg,#1d4ed8,#0f766e);cursor:pointer}
button:disabled{opacity:.6;cursor:wait}
.files{list-style:none;margin:0;padding:0;display:flex;flex-direction:column;gap:.5rem}
.files li{display:flex;justify-content:space-between;align-items:center;padding:.5rem .75rem;
  background:#f9fafb;border:1px solid #e5e7eb;border-radius:.5rem;font-size:.875rem}
.files button.remove{padding:.125rem .5rem;background:none;color:#ef4444;font-size:1.25rem}
.error{margin-top:1.5rem;max-width:28rem;padding:1rem;background:#fef2f2;border-left:4px solid #ef4444;color:#b91c1c}
"#;

const FORM_SCRIPT: &str = r#"
const form=document.getElementById('lesson');
const picker=document.getElementById('files');
const drop=document.getElementById('drop');
const list=document.getElementById('file-list');
const err=document.getElementById('error');
const submit=form.querySelector('button[type=submit]');
const accepted=f=>f.type.startsWith('image/')||f.type==='application/pdf';
let attached=[];
let nextId=0;
const show=()=>{
  list.replaceChildren(...attached.map(a=>{
    const li=document.createElement('li');
    const name=document.createElement('span');name.textContent=a.file.name;
    const rm=document.createElement('button');rm.type='button';rm.className='remove';
    rm.dataset.id=a.id;rm.title='Retirer';rm.textContent='×';
    li.append(name,rm);return li;}));
  list.hidden=attached.length===0;
};
const add=files=>{
  attached=attached.concat([...files].filter(accepted).map(file=>({id:String(nextId++),file})));
  show();
};
picker.addEventListener('change',()=>{add(picker.files);picker.value='';});
drop.addEventListener('dragover',e=>e.preventDefault());
drop.addEventListener('drop',e=>{e.preventDefault();add(e.dataTransfer.files);});
list.addEventListener('click',e=>{
  const id=e.target.dataset.id;
  if(id===undefined)return;
  attached=attached.filter(a=>a.id!==id);show();
});
const read=f=>new Promise((ok,ko)=>{const r=new FileReader();r.onloadend=()=>ok({name:f.name,dataUrl:r.result});
  r.onerror=ko;r.readAsDataURL(f);});
const failure=async res=>{
  const text=await res.text();
  try{const j=JSON.parse(text);if(j.error)return j.error;}catch(_){}
  return 'Erreur '+res.status+(text?' : '+text:'');
};
form.addEventListener('submit',async e=>{
  e.preventDefault();
  submit.disabled=true;submit.textContent='Analyse & Génération...';
  try{
    const payload=await Promise.all(attached.map(a=>read(a.file)));
    const body={level:form.level.value,period:form.period.value,week:form.week.value,
      subject:form.subject.value,files:payload};
    const res=await fetch('/api/generate',{method:'POST',headers:{'Content-Type':'application/json'},
      body:JSON.stringify(body)});
    if(res.ok){location.href='/';return;}
    err.textContent=await failure(res);err.hidden=false;
  }catch(x){err.textContent=String(x);err.hidden=false;}
  finally{submit.disabled=false;submit.textContent='Générer la Carte';}
});
"#;

fn options<T: Copy + PartialEq>(
    items: impl Iterator<Item = T>,
    value: impl Fn(T) -> String,
    label: impl Fn(T) -> String,
    selected: T,
) -> String {
    items
        .map(|item| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                escape_html(&value(item)),
                if item == selected { " selected" } else { "" },
                escape_html(&label(item)),
            )
        })
        .collect::<Vec<_>>()
        .join("")
}

/// The input form, with the last error message if any.
pub fn render_form_page(error: Option<&str>) -> String {
    let defaults = LessonForm::default();
    let levels = options(
        Level::all(),
        |l| l.label(),
        |l| format!("{} ({})", l.label(), l.caption()),
        defaults.level,
    );
    let periods = options(Period::all(), |p| p.label(), |p| p.label(), defaults.period);
    let weeks = options(Week::all(), |w| w.label(), |w| w.label(), defaults.week);

    let mut out = String::with_capacity(8 * 1024);
    out.push_str("<!DOCTYPE html><html lang=\"fr\"><head><meta charset=\"utf-8\">");
    out.push_str("<title>Al-Muallim</title><style>");
    out.push_str(FORM_STYLE);
    out.push_str("</style></head><body>");
    out.push_str(
        "<div class=\"brand\"><h1>Al-Muallim</h1>\
         <p>Générateur de Fiches Pédagogiques Interactives</p></div>",
    );
    out.push_str("<form id=\"lesson\"><h2>Créer une Leçon</h2>");
    out.push_str(&format!(
        "<div><label for=\"level\">Niveau Scolaire</label><select id=\"level\" name=\"level\">{levels}</select></div>"
    ));
    out.push_str(&format!(
        "<div class=\"row\"><div><label for=\"period\">Période</label><select id=\"period\" name=\"period\">{periods}</select></div>\
         <div><label for=\"week\">Semaine</label><select id=\"week\" name=\"week\">{weeks}</select></div></div>"
    ));
    out.push_str(
        "<div id=\"drop\" class=\"drop\"><label for=\"files\">Ajouter Images ou PDFs</label>\
         <input id=\"files\" type=\"file\" multiple accept=\"image/*,application/pdf\">\
         <small>(Supporte plusieurs fichiers)</small></div>\
         <ul id=\"file-list\" class=\"files\" hidden></ul>",
    );
    out.push_str(
        "<div><label for=\"subject\">Sujet de la leçon (requis sans fichier)</label>\
         <input id=\"subject\" name=\"subject\" type=\"text\" placeholder=\"Ex: La forêt, Les métiers...\"></div>",
    );
    out.push_str("<button type=\"submit\">Générer la Carte</button></form>");
    match error {
        Some(msg) => out.push_str(&format!(
            "<div id=\"error\" class=\"error\">{}</div>",
            escape_html(msg)
        )),
        None => out.push_str("<div id=\"error\" class=\"error\" hidden></div>"),
    }
    out.push_str("<script>");
    out.push_str(FORM_SCRIPT);
    out.push_str("</script></body></html>");
    out
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(controller): State<AppState>) -> Html<String> {
    let state = controller.snapshot();
    match &state.plan {
        Some(plan) => Html(render_plan_html(
            plan,
            RenderOptions {
                chrome: true,
                back_href: "/new",
            },
        )),
        None => Html(render_form_page(state.error.as_deref())),
    }
}

async fn new_lesson(State(controller): State<AppState>) -> Redirect {
    controller.reset();
    Redirect::to("/")
}

async fn card(State(controller): State<AppState>) -> Result<Html<String>, AppError> {
    let plan = controller
        .current_plan()
        .ok_or_else(|| AppError::not_found("no lesson plan generated yet"))?;
    Ok(Html(render_plan_html(&plan, RenderOptions::default())))
}

async fn generate(
    State(controller): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Result<Response, AppError> {
    let form = body.form().map_err(AppError::bad_request)?;

    let mut ingestor = Ingestor::new();
    for file in &body.files {
        ingestor.ingest_data_url(&file.name, &file.data_url);
    }

    let plan = controller
        .submit(&form, &ingestor.inline_payloads())
        .await?;
    Ok(Json(plan).into_response())
}

async fn current_plan(State(controller): State<AppState>) -> Result<Response, AppError> {
    let plan = controller
        .current_plan()
        .ok_or_else(|| AppError::not_found("no lesson plan generated yet"))?;
    Ok(Json(plan).into_response())
}

async fn reset(State(controller): State<AppState>) -> StatusCode {
    controller.reset();
    StatusCode::NO_CONTENT
}

async fn schema() -> Json<serde_json::Value> {
    Json(lesson_plan_schema())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
