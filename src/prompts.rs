//! Prompts - Templates for every model call in the question pipeline
//!
//! The system hint carries the plant's schema semantics (department codes,
//! the `status = 10` rule, the shape of `qc_ng`). Builders splice in the
//! current date so relative Thai date expressions resolve correctly.

use crate::dates::DateContext;

/// Schema semantics and answering rules for the factory database.
pub const SYSTEM_HINT: &str = r#"คุณคือผู้ช่วย AI สำหรับโรงงานผลิตรถยนต์ เชี่ยวชาญ SQL (ใช้เฉพาะ SELECT/EXPLAIN)

กติกา:
- ตอบเป็นภาษาไทย กระชับ ชัดเจน
- อ้างอิงโครงสร้างตารางจริงจากฐานข้อมูลเท่านั้น
- ห้ามใช้ INSERT/UPDATE/DELETE/DDL
- ถ้าไม่แน่ใจ ให้ระบุข้อสมมติที่ใช้

ความหมายของฟิลด์ข้อมูลสำคัญ:
- item: รุ่นสินค้า/โมเดล (เช่น RJ08, RJ10, G-LEATHER) ไม่ใช่ชื่อแผนก
- qty: จำนวน (ชิ้น/หน่วย)
- created_at: วันที่และเวลาที่บันทึกข้อมูล
- status: สถานะของข้อมูล
  * status = 10 หมายถึง ใช้งาน (active)
  * status = 20 หมายถึง ไม่ได้ใช้งาน (inactive/deleted)

ชื่อแผนก (Department) ในโรงงาน:
- FB = Front Body (แผนกเย็บส่วนหน้าตัวถัง)
- FC = Front Cushion (แผนกเย็บเบาะหน้า)
- RB = Rear Body (แผนกเย็บส่วนหลังตัวถัง)
- RC = Rear Cushion (แผนกเย็บเบาะหลัง)
- 3RD = Third Party (แผนกเย็บเบาะแถว 3RD)
- SUB = Subcomponent (งานเย็บอะไหล่)

โครงสร้างตารางการผลิต (Columns: id, item, qty, status, created_at):
- sewing_fb, sewing_fc, sewing_rb, sewing_rc, sewing_3rd, sewing_sub
- แต่ละตารางแยกแผนกอยู่แล้ว ไม่ต้อง filter ด้วย item
- ถ้าต้องการแยกตามแผนก ให้ query แต่ละตารางแล้วรวมด้วย UNION ALL

ตัวอย่าง:
  คำถาม: "เปรียบเทียบแผนก FB กับ FC"
  SELECT 'FB' AS dept, SUM(qty) AS total FROM sewing_fb WHERE status = 10 AND DATE(created_at) = CURDATE()
  UNION ALL
  SELECT 'FC', SUM(qty) FROM sewing_fc WHERE status = 10 AND DATE(created_at) = CURDATE()

ตารางควบคุมคุณภาพ (qc_*):
- qc_ng: งาน NG (Columns: id, part, detail, lot, process, qty, created_at)
  * process: แผนกที่ผลิตของเสีย (R/C, F/C, F/B, 3RD, R/B)
  * ไม่มี status
- qc_issue: ชื่อลักษณะงาน NG (Master Data)
- qc_fb/fc/rb/rc/3rd: งาน OK แต่ละแผนก
- qc_sub: QC งานอะไหล่"#;

/// Answers the classifier is expected to produce.
pub const CLASSIFY_DATABASE: &str = "database";
pub const CLASSIFY_GENERAL: &str = "general";

/// Temperatures for the individual calls. SQL generation and summaries use
/// the configured provider temperature.
pub const CLASSIFY_TEMPERATURE: f32 = 0.0;
pub const GENERAL_TEMPERATURE: f32 = 0.7;

/// Prompt asking the model whether a question needs the database.
pub fn build_classify_prompt(date: &DateContext, question: &str) -> String {
    format!(
        r#"คุณเป็น AI ที่ช่วยจำแนกประเภทคำถาม

**ข้อมูลวันที่ปัจจุบัน:**
- วันนี้: {today_th} ({today})
- เมื่อวาน: {yesterday_th} ({yesterday})
- สัปดาห์นี้: {week_start} ถึง {week_end}
- เดือนนี้: {month} {year_th}
- เวลาปัจจุบัน: {time}

ฐานข้อมูลของเรามีข้อมูลเกี่ยวกับ: การผลิตรถยนต์, คุณภาพ QC/NG (ของเสีย), พนักงาน, เป้าหมายการผลิต, ปัญหาในโรงงาน, สายการผลิต

คำถาม: "{question}"

คำถามนี้ต้องการข้อมูลจากฐานข้อมูล หรือเป็นคำถามทั่วไป?

ตัวอย่าง "database":
- "วันนี้มีของเสียกี่ชิ้น"
- "เมื่อวานมีของเสียเท่าไหร่"
- "แผนกไหนมีปัญหามากที่สุด"

ตัวอย่าง "general":
- "สวัสดี"
- "วันนี้วันอะไร"
- "ขอบคุณ"

ตอบเพียง 1 คำ: "database" หรือ "general"

คำตอบ:"#,
        today_th = date.today_th,
        today = date.today,
        yesterday_th = date.yesterday_th,
        yesterday = date.yesterday,
        week_start = date.week_start,
        week_end = date.week_end,
        month = date.month,
        year_th = date.year_th,
        time = date.time,
        question = question,
    )
}

/// Prompt for small talk and date questions answered without SQL.
pub fn build_general_prompt(date: &DateContext, question: &str) -> String {
    format!(
        r#"คุณเป็น AI ผู้ช่วยที่เป็นมิตรและมีความรู้

**ข้อมูลวันที่และเวลาปัจจุบัน:**
- วันนี้: {today_th} ({today})
- เมื่อวาน: {yesterday_th}
- วันในสัปดาห์: {day_of_week}
- เดือน: {month} พ.ศ. {year_th}
- เวลา: {time} น.

คำถาม: {question}

กรุณาตอบคำถามเป็นภาษาไทยที่เป็นธรรมชาติและเข้าใจง่าย
ถ้าคำถามถามเกี่ยวกับวันที่/เวลา ให้ใช้ข้อมูลที่ให้ไว้ข้างต้น:"#,
        today_th = date.today_th,
        today = date.today,
        yesterday_th = date.yesterday_th,
        day_of_week = date.day_of_week,
        month = date.month,
        year_th = date.year_th,
        time = date.time,
        question = question,
    )
}

/// Prompt for SQL generation over the selected tables only.
pub fn build_sql_prompt(
    date: &DateContext,
    table_info: &str,
    dialect: &str,
    top_k: usize,
    question: &str,
) -> String {
    format!(
        r#"{hint}

**Current Date Information:**
- Today (วันนี้): {today}
- Yesterday (เมื่อวาน): {yesterday}
- This Week (สัปดาห์นี้): {week_start} to {week_end}
- This Month (เดือนนี้): {month_start} to {month_end}
- Current Time: {time}

Tables:
{table_info}
Dialect: {dialect}, Limit: {top_k}

**IMPORTANT RULES:**
1. qc_ng table: id, part, detail, lot, process, qty, created_at
   - qc_ng has NO 'status' column!

2. Other tables MUST use: WHERE status = 10

3. **Date Filtering (USE CURRENT DATE INFO ABOVE):**
   - 'วันนี้' (today) → WHERE DATE(created_at) = '{today}'
   - 'เมื่อวาน' (yesterday) → WHERE DATE(created_at) = '{yesterday}'
   - 'สัปดาห์นี้' (this week) → WHERE DATE(created_at) BETWEEN '{week_start}' AND '{week_end}'
   - 'เดือนนี้' (this month) → WHERE DATE(created_at) BETWEEN '{month_start}' AND '{month_end}'

4. **Combine Multiple Tables:**
   - For 'total production': Use UNION ALL for all sewing tables

5. Return at most {top_k} rows unless the question asks for a total.
6. Answer with a single SELECT statement only.

Question: {question}
SQL:"#,
        hint = SYSTEM_HINT,
        today = date.today,
        yesterday = date.yesterday,
        week_start = date.week_start,
        week_end = date.week_end,
        month_start = date.month_start,
        month_end = date.month_end,
        time = date.time,
        table_info = table_info,
        dialect = dialect,
        top_k = top_k,
        question = question,
    )
}

/// Prompt turning a raw result preview into a short Thai answer.
pub fn build_summary_prompt(question: &str, result_preview: &str) -> String {
    format!(
        r#"Question: {question}
SQL Result: {result_preview}

Summarize the result in Thai with brief explanation:
1. Answer the question directly with numbers/data
2. Add brief context or insight (1 sentence)
3. NO SQL code, NO table names, NO technical details

Example format:
วันนี้ผลิตได้ 1,234 ชิ้น รวมทุกแผนกทั้งหมด

OR for multiple data:
แผนกที่มีของเสียมากที่สุด 3 อันดับ:
• R/C: 914 ชิ้น (สูงสุด)
• F/C: 589 ชิ้น
• F/B: 476 ชิ้น

Keep it professional and easy to understand.

Answer:"#
    )
}

/// Prompt asking for a chart JSON describing an answer, or `null`.
pub fn build_chart_prompt(question: &str, answer: &str) -> String {
    format!(
        r#"วิเคราะห์คำถามและคำตอบต่อไปนี้ แล้วสร้าง JSON config สำหรับกราฟ

คำถาม: {question}
คำตอบ: {answer}

ถ้าข้อมูลเหมาะกับการแสดงเป็นกราฟ ให้สร้าง JSON ดังนี้:

{{
  "type": "bar",
  "title": "ชื่อกราฟภาษาไทย",
  "x_label": "แกน X",
  "y_label": "แกน Y",
  "data": [
    {{"label": "ชื่อ 1", "value": 100}},
    {{"label": "ชื่อ 2", "value": 200}}
  ]
}}

**สำคัญ:**
1. type ต้องเป็น bar, line, pie หรือ doughnut
2. ให้เรียง data จากมากไปน้อย
3. ตอบเป็น JSON เท่านั้น
4. ถ้าไม่เหมาะสร้างกราฟ ตอบ: null

JSON Config:"#
    )
}
