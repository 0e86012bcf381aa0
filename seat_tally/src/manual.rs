/*!

This is the long-form manual for `seat_tally` and `seattally`.

## Input formats

Two collections are read: the district results (one row per candidate) and
the party-list allocation (one row per party).

The following formats are supported:
* `csv` Comma Separated Values, with a header row
* `xlsx` Excel workbook, with a header row
* `json` the results file used as a local fallback
* Google Sheets, through the CSV export of a shared spreadsheet

### District results

The header of the first row decides which column holds which field. Thai and
English labels are both understood; the comparison ignores case and the
surrounding whitespace.

| field    | Thai header       | English header |
|----------|-------------------|----------------|
| region   | `ภาค`             | `region`       |
| province | `จังหวัด`          | `province`     |
| district | `เขต`             | `district`     |
| name     | `ชื่อ`             | `candidate`    |
| party    | `พรรค 2569`        | `party`        |
| votes    | `คะแนน`           | `votes`        |
| counted  | `นับคะแนนแล้ว`      | `counted`      |

```text
region,province,district,candidate,party,votes,counted
เหนือ,เชียงใหม่,1,Anna,Green,12034,4/20
เหนือ,เชียงใหม่,1,Bob,Blue,9811,4/20
```

Rows without a province, or whose district is not a positive number, are
dropped. Votes that cannot be read count as 0. A district whose best candidate
has 0 votes is considered as not reported yet and has no winner.

### Party list

| field | accepted headers |
|-------|------------------|
| party | `พรรค`, `ชื่อพรรค`, `party` |
| votes | `คะแนน`, `votes` |
| seats | `ที่นั่ง`, `จำนวนที่นั่ง`, `ส.ส.`, `สส`, `บัญชีรายชื่อ`, `จำนวน`, `seats` and the `ส.ส. บัญชีรายชื่อ` variants |

Rows without a party name are dropped.

### `json`

```text
{
  "candidates": [
    {"region": "เหนือ", "province": "เชียงใหม่", "district": 1, "name": "Anna",
     "party": "Green", "votes": 12034, "counted": "4/20"}
  ],
  "partyList": [{"party": "Green", "votes": 150000, "seats": 3}]
}
```

Numbers may also be given as strings.

## Seats and colors

A party gets one district seat per district it leads, plus the seats of its
party-list row. The color of a party is found by trying, in order:
1. the color registered for the party name (built-in table, or `partyColors`),
2. the color already attached to the party (party-list rows may carry one),
3. a palette color picked by the position of the party.

## Configuration

The program accepts a configuration file in JSON:

```text
{
  "outputSettings": {"contestName": "General election", "outputPath": "summary.json"},
  "districtSource": {"provider": "csv", "filePath": "districts.csv"},
  "partyListSource": {"provider": "xlsx", "filePath": "party_list.xlsx",
                      "excelWorksheetName": "Sheet1"},
  "googleSheet": {"sheetId": "1AbC...", "districtGid": "0", "partyListGid": "42"},
  "fallbackResults": "results.json",
  "rules": {"majorityThreshold": 250, "includePartyList": true,
            "palette": ["#f38b00", "#d92d27"], "partyColors": {"Green": "#1aa260"}}
}
```

All the fields are optional. Paths are relative to the configuration file.
When `googleSheet` is present, the data is downloaded first; if the download
fails, `fallbackResults` is used instead. The command line flags take precedence
over the configuration file.

 */
