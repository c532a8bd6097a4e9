//! UI Routes - HTML pages for the jejak-ui web interface
//!
//! Embedded HTML/CSS/JS (vanilla ES6+, no frameworks). The upload page
//! drives the workflow API: attach receipt → detect products → enter
//! quantities → calculate and save.

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_page))
        .route("/upload", get(upload_page))
}

/// Root page - home and entry point
async fn root_page() -> impl IntoResponse {
    Html(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>jejak - Carbon Footprint Tracker</title>
    <style>
        body {
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 800px;
            margin: 40px auto;
            padding: 20px;
            line-height: 1.6;
        }
        h1 {
            color: #333;
            border-bottom: 2px solid #2e8b57;
            padding-bottom: 10px;
        }
        .button {
            display: inline-block;
            padding: 10px 20px;
            background: #2e8b57;
            color: white;
            text-decoration: none;
            border-radius: 4px;
            margin: 10px 5px;
        }
        .button:hover {
            background: #24704a;
        }
    </style>
</head>
<body>
    <h1>jejak - Carbon Footprint Tracker</h1>
    <p>Upload a photo of your grocery receipt to estimate the carbon footprint of your purchases.</p>

    <h2>How it works</h2>
    <ul>
        <li>Upload a receipt photo (JPEG or PNG)</li>
        <li>Products are detected automatically</li>
        <li>Enter quantities per product</li>
        <li>Get emission totals, category shares and an offset cost estimate</li>
    </ul>

    <p>
        <a href="/upload" class="button">Upload Receipt</a>
    </p>

    <p><small>Module: jejak-ui v0.1.0</small></p>
</body>
</html>
        "#,
    )
}

/// Upload page - the full receipt workflow
async fn upload_page() -> impl IntoResponse {
    Html(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Upload Receipt - jejak</title>
    <style>
        body {
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 700px;
            margin: 40px auto;
            padding: 20px;
        }
        h1 {
            color: #333;
            border-bottom: 2px solid #2e8b57;
            padding-bottom: 10px;
        }
        .card {
            background: #f7f7f7;
            border: 1px solid #ddd;
            border-radius: 6px;
            padding: 20px;
            margin: 16px 0;
        }
        button {
            padding: 8px 18px;
            background: #2e8b57;
            color: white;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }
        button:disabled {
            background: #9bbfab;
            cursor: default;
        }
        table { width: 100%; border-collapse: collapse; }
        td, th { padding: 6px; border-bottom: 1px solid #ddd; text-align: left; }
        input[type=number] { width: 90px; }
        .bar-track {
            height: 12px;
            background: #e0e0e0;
            border-radius: 6px;
            overflow: hidden;
        }
        .bar-fill { height: 100%; background: #2e8b57; }
        .severity { font-weight: bold; }
    </style>
</head>
<body>
    <h1>Upload Receipt</h1>

    <div class="card">
        <input type="file" id="file" accept=".jpg,.jpeg,.png">
        <button id="process" disabled>Detect Products</button>
        <p id="status"></p>
    </div>

    <div class="card" id="items-card" style="display:none">
        <h3>Detected Products</h3>
        <table id="items"></table>
        <p><button id="calculate">Calculate &amp; Save</button></p>
    </div>

    <div class="card" id="result-card" style="display:none">
        <h3 id="total"></h3>
        <table id="detail"></table>
        <div id="shares"></div>
        <p class="severity" id="severity"></p>
        <p id="offset"></p>
    </div>

    <p><a href="/">&larr; Back to Home</a></p>

    <script>
        let sessionId = null;

        const el = (id) => document.getElementById(id);
        const status = (msg) => { el('status').textContent = msg; };

        async function api(method, path, body, isForm) {
            const opts = { method };
            if (body && isForm) { opts.body = body; }
            else if (body) {
                opts.headers = { 'Content-Type': 'application/json' };
                opts.body = JSON.stringify(body);
            }
            const res = await fetch(path, opts);
            const data = await res.json();
            if (!res.ok) { throw new Error(data.error ? data.error.message : res.statusText); }
            return data;
        }

        async function init() {
            const created = await api('POST', '/session');
            sessionId = created.session_id;
        }
        init();

        el('file').addEventListener('change', async () => {
            const file = el('file').files[0];
            if (!file) { return; }
            const form = new FormData();
            form.append('file', file);
            try {
                await api('POST', `/session/${sessionId}/receipt`, form, true);
                el('process').disabled = false;
                el('items-card').style.display = 'none';
                el('result-card').style.display = 'none';
                status(`Selected: ${file.name}`);
            } catch (e) {
                status(e.message);
            }
        });

        el('process').addEventListener('click', async () => {
            el('process').disabled = true;
            status('Detecting products...');
            try {
                const data = await api('POST', `/session/${sessionId}/recognize`);
                renderItems(data.products);
                status(`${data.products.length} product(s) detected`);
            } catch (e) {
                status('Receipt processing failed: ' + e.message);
            } finally {
                el('process').disabled = false;
            }
        });

        function renderItems(products) {
            const table = el('items');
            table.innerHTML = '';
            products.forEach((name, i) => {
                const row = document.createElement('tr');
                row.innerHTML = `
                    <td>${name}</td>
                    <td><input type="number" min="0" placeholder="Amount" data-pos="${i}" class="qty"></td>
                    <td>
                        <select data-pos="${i}" class="unit">
                            <option value="kg">kg</option>
                            <option value="gram">gram</option>
                            <option value="liter">liter</option>
                            <option value="ml">ml</option>
                            <option value="pcs">pcs</option>
                        </select>
                    </td>`;
                table.appendChild(row);
            });
            table.addEventListener('change', async (ev) => {
                const pos = ev.target.dataset.pos;
                if (pos === undefined) { return; }
                const body = ev.target.classList.contains('qty')
                    ? { quantity_text: ev.target.value }
                    : { unit: ev.target.value };
                try { await api('PUT', `/session/${sessionId}/items/${pos}`, body); }
                catch (e) { status(e.message); }
            });
            el('items-card').style.display = 'block';
        }

        el('calculate').addEventListener('click', async () => {
            el('calculate').disabled = true;
            status('Calculating...');
            try {
                const data = await api('POST', `/session/${sessionId}/calculate`);
                renderResult(data.result, data.summary);
                status('');
            } catch (e) {
                status('Calculation failed: ' + e.message);
            } finally {
                el('calculate').disabled = false;
            }
        });

        function renderResult(result, summary) {
            el('total').textContent = `Total Emission: ${result.total_karbon.toFixed(2)} kg CO2e`;

            const detail = el('detail');
            detail.innerHTML = '<tr><th>Product</th><th>Emission (kg)</th></tr>';
            result.detail.forEach((d) => {
                const row = document.createElement('tr');
                row.innerHTML = `<td>${d.produk}</td><td>${d.emisi.toFixed(2)}</td>`;
                detail.appendChild(row);
            });

            const shares = el('shares');
            shares.innerHTML = '';
            Object.entries(summary.category_shares).forEach(([category, pct]) => {
                const div = document.createElement('div');
                div.innerHTML = `
                    <div style="display:flex;justify-content:space-between">
                        <span>${category}</span><span>${pct}%</span>
                    </div>
                    <div class="bar-track"><div class="bar-fill" style="width:${pct}%"></div></div>`;
                shares.appendChild(div);
            });

            el('severity').textContent = `Emission Level: ${summary.severity}`;
            el('offset').textContent =
                `Estimated offset cost: Rp ${summary.offset_cost.toLocaleString('id-ID')}`;
            el('result-card').style.display = 'block';
        }
    </script>
</body>
</html>
        "#,
    )
}
